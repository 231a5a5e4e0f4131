//! Module placement rules and generated Android modules.
//!
//! Archive metadata does not say where a module belongs inside the editor, so
//! destinations are derived from the module ID. Android SDK/NDK/JDK components
//! are not listed in the archive at all and are synthesised per editor version.

use std::cmp::Ordering;

use super::model::{EditorRelease, InstallOptions, ModuleRelease, Package};
use super::version::compare_versions;

fn editor_data_path(platform: &str, rest: &str) -> String {
    if platform == "darwin" {
        if rest.is_empty() {
            unity_path("")
        } else {
            format!("{{UNITY_PATH}}/{}", rest)
        }
    } else {
        format!("{{UNITY_PATH}}/Editor/Data/{}", rest)
    }
}

fn unity_path(rest: &str) -> String {
    format!("{{UNITY_PATH}}{}", rest)
}

/// Destination template for a module, or `None` when the installer picks its own.
///
/// `extension` is the artifact extension without the leading dot.
pub fn module_destination(platform: &str, id: &str, extension: &str) -> Option<String> {
    let zip = extension.eq_ignore_ascii_case("zip");
    let destination = match id {
        "mono" | "visualstudio" | "exampleprojects" | "example" | "facebookgameroom" => {
            return None
        }
        "monodevelop" => unity_path(""),
        "documentation" if zip => editor_data_path(platform, ""),
        "documentation" => unity_path(""),
        "standardassets" if platform == "darwin" => unity_path("/Standard Assets"),
        "standardassets" => unity_path("/Editor"),
        "android" => editor_data_path(platform, "PlaybackEngines/AndroidPlayer"),
        "android-sdk-build-tools" if zip => {
            editor_data_path(platform, "PlaybackEngines/AndroidPlayer/SDK/build-tools")
        }
        "android-sdk-platforms" if zip => {
            editor_data_path(platform, "PlaybackEngines/AndroidPlayer/SDK/platforms")
        }
        "android-sdk-build-tools"
        | "android-sdk-platforms"
        | "android-sdk-platform-tools"
        | "android-sdk-ndk-tools" => {
            editor_data_path(platform, "PlaybackEngines/AndroidPlayer/SDK")
        }
        "android-ndk" => editor_data_path(platform, "PlaybackEngines/AndroidPlayer/NDK"),
        "android-open-jdk" => editor_data_path(platform, "PlaybackEngines/AndroidPlayer/OpenJDK"),
        "ios" => unity_path("/PlaybackEngines"),
        "tvos" | "appletv" => editor_data_path(platform, "PlaybackEngines/AppleTVSupport"),
        "linux" | "linux-mono" | "linux-il2cpp" => {
            editor_data_path(platform, "PlaybackEngines/LinuxStandaloneSupport")
        }
        "mac" | "mac-mono" | "mac-il2cpp" => {
            unity_path("/Unity.app/Contents/PlaybackEngines/MacStandaloneSupport")
        }
        "samsungtv" | "samsung-tv" => editor_data_path(platform, "PlaybackEngines/STVPlayer"),
        "tizen" => editor_data_path(platform, "PlaybackEngines/TizenPlayer"),
        "vuforia" | "vuforia-ar" => editor_data_path(platform, "PlaybackEngines/VuforiaSupport"),
        "webgl" => editor_data_path(platform, "PlaybackEngines/WebGLSupport"),
        "windows" | "windows-mono" | "windows-il2cpp" => {
            editor_data_path(platform, "PlaybackEngines/WindowsStandaloneSupport")
        }
        "facebook" | "facebook-games" => editor_data_path(platform, "PlaybackEngines/Facebook"),
        "lumin" => editor_data_path(platform, "PlaybackEngines/LuminSupport"),
        _ if id.starts_with("language-") && platform == "darwin" => {
            unity_path("/Unity.app/Contents/Localization")
        }
        _ if id.starts_with("language-") => editor_data_path(platform, "Localization"),
        _ => unity_path(""),
    };
    Some(destination)
}

/// Extension of the last path segment of a URL, without the dot.
pub fn url_extension(url: &str) -> &str {
    let name = url.rsplit('/').next().unwrap_or(url);
    match name.rfind('.') {
        Some(idx) => &name[idx + 1..],
        None => "",
    }
}

fn host_name(platform: &str) -> &str {
    if platform == "win32" {
        "windows"
    } else {
        platform
    }
}

fn external_module(
    id: &str,
    name: String,
    version: &str,
    download_url: String,
    rename: Option<(String, String)>,
) -> ModuleRelease {
    let (rename_from, rename_to) = match rename {
        Some((from, to)) => (Some(from), Some(to)),
        None => (None, None),
    };

    ModuleRelease {
        id: id.to_string(),
        name,
        package: Package {
            install_options: InstallOptions {
                rename_from,
                rename_to,
                ..Default::default()
            },
            version: version.to_string(),
            download_url,
            ..Default::default()
        },
        ..Default::default()
    }
}

/// Append the Android SDK, NDK and JDK modules appropriate for the release.
pub fn add_android_modules(release: &mut EditorRelease, platform: &str) {
    let editor_version = release.version.clone();
    let host = host_name(platform);
    let arch = "x86_64";
    let sdk = |rest: &str| editor_data_path(platform, &format!("PlaybackEngines/AndroidPlayer/{}", rest));

    let mut modules = Vec::new();

    let (api, revision, legacy) =
        if compare_versions(&editor_version, "2019.4.9f1") == Ordering::Greater {
            ("29", "05", "10")
        } else {
            ("28", "06", "9")
        };
    modules.push(external_module(
        "android-sdk-platforms",
        format!("Android SDK Platforms {}", api),
        api,
        format!(
            "https://dl.google.com/android/repository/platform-{}_r{}.zip",
            api, revision
        ),
        Some((
            sdk(&format!("SDK/platforms/android-{}", legacy)),
            sdk(&format!("SDK/platforms/android-{}", api)),
        )),
    ));

    modules.push(external_module(
        "android-sdk-ndk-tools",
        "Android SDK & NDK Tools".to_string(),
        "26.1.1",
        format!(
            "https://dl.google.com/android/repository/sdk-tools-{}-4333796.zip",
            host
        ),
        None,
    ));
    modules.push(external_module(
        "android-sdk-platform-tools",
        "Android SDK Platform Tools".to_string(),
        "28.0.1",
        format!(
            "https://dl.google.com/android/repository/platform-tools_r28.0.1-{}.zip",
            host
        ),
        None,
    ));
    modules.push(external_module(
        "android-sdk-build-tools",
        "Android SDK Build Tools".to_string(),
        "28.0.3",
        format!(
            "https://dl.google.com/android/repository/build-tools_r28.0.3-{}.zip",
            host
        ),
        None,
    ));

    let ndk = if compare_versions(&editor_version, "2021.1.0a1") == Ordering::Greater {
        "21d"
    } else if compare_versions(&editor_version, "2019.3.0a4") == Ordering::Greater {
        "19"
    } else {
        "16b"
    };
    modules.push(external_module(
        "android-ndk",
        format!("Android NDK {}", ndk),
        ndk,
        format!(
            "https://dl.google.com/android/repository/android-ndk-r{}-{}-{}.zip",
            ndk, host, arch
        ),
        Some((sdk(&format!("NDK/android-ndk-r{}", ndk)), sdk("NDK"))),
    ));

    let jdk_platform = match host {
        "windows" => "win",
        "darwin" => "mac",
        other => other,
    };
    modules.push(external_module(
        "android-open-jdk",
        "OpenJDK".to_string(),
        "8u172-b11",
        format!(
            "http://download.unity3d.com/download_unity/open-jdk/open-jdk-{}-x64/jdk8u172-b11_4be8440cc514099cfe1b50cbc74128f6955cd90fd5afe15ea7be60f832de67b4.zip",
            jdk_platform
        ),
        None,
    ));

    for mut module in modules {
        let extension = url_extension(&module.package.download_url).to_string();
        module.package.install_options.destination =
            module_destination(platform, &module.id, &extension);
        release.modules.push(module);
    }
}
