//! Platform path conventions of artifact definition sources.
//!
//! Each check returns the problems it found as messages; an empty list means
//! the input follows the conventions.

/// Top-level macOS directories that are symbolic links into `/private`
const MACOS_PRIVATE_SUB_PATHS: &[&str] = &["etc", "tftpboot", "tmp", "var"];

const MACOS_PRIVATE_PREFIX: &str = "/private";

/// Path variables of the users knowledge base usable in Windows paths
const WINDOWS_USERS_VARIABLES: &[&str] = &[
    "%%users.appdata%%",
    "%%users.homedir%%",
    "%%users.localappdata%%",
    "%%users.temp%%",
    "%%users.username%%",
    "%%users.userprofile%%",
];

/// Lowercase path prefixes with a dedicated users variable
const WINDOWS_PREFIX_REPLACEMENTS: &[(&str, &str, &str)] = &[
    (
        "%%users.userprofile%%\\appdata\\local\\",
        "%%users.userprofile%%\\AppData\\Local",
        "%%users.localappdata%%",
    ),
    (
        "%%users.userprofile%%\\appdata\\roaming\\",
        "%%users.userprofile%%\\AppData\\Roaming",
        "%%users.appdata%%",
    ),
    (
        "%%users.userprofile%%\\application data\\",
        "%%users.userprofile%%\\Application Data",
        "%%users.appdata%%",
    ),
    (
        "%%users.userprofile%%\\local settings\\application data\\",
        "%%users.userprofile%%\\Local Settings\\Application Data",
        "%%users.localappdata%%",
    ),
];

const CURRENT_CONTROL_SET_VARIABLE: &str = "%%CURRENT_CONTROL_SET%%";

/// Checks that macOS paths under `/private` come paired with the path of
/// their symbolic link and the other way around.
pub fn check_macos_paths(paths: &[String], separator: &str) -> Vec<String> {
    let mut problems = Vec::new();
    let mut private_paths = Vec::new();
    let mut linked_paths = Vec::new();

    for path in paths {
        if path.is_empty() {
            problems.push("Empty path".to_string());
            continue;
        }

        let path_lower = path.to_lowercase();
        let segments: Vec<&str> = path_lower.split(separator).collect();
        if segments.len() == 1 {
            continue;
        }

        if MACOS_PRIVATE_SUB_PATHS.contains(&segments[1]) {
            linked_paths.push(path.as_str());
        } else if segments[1] == "private" {
            match segments.get(2) {
                Some(sub_path) if MACOS_PRIVATE_SUB_PATHS.contains(sub_path) => {
                    private_paths.push(path.as_str())
                }
                _ => problems.push(format!("Unsupported private path: {}", path)),
            }
        }
    }

    for private_path in &private_paths {
        let linked_path = private_path.get(MACOS_PRIVATE_PREFIX.len()..).unwrap_or_default();
        if !linked_paths.contains(&linked_path) {
            problems.push(format!(
                "Missing symbolic link: {} for path: {}",
                linked_path, private_path
            ));
        }
    }

    for linked_path in &linked_paths {
        let private_path = format!("{}{}", MACOS_PRIVATE_PREFIX, linked_path);
        if !private_paths.contains(&private_path.as_str()) {
            problems.push(format!(
                "Missing path: {} for symbolic link: {}",
                private_path, linked_path
            ));
        }
    }

    problems
}

/// Checks a Windows path against its separator and the users variables.
pub fn check_windows_path(path: &str, separator: &str) -> Vec<String> {
    let mut problems = Vec::new();

    let forward_slashes = path.matches('/').count();
    let backslashes = path.matches('\\').count();
    if forward_slashes < backslashes && separator != "\\" {
        problems.push(format!(
            "Incorrect path separator: {} in path: {}",
            separator, path
        ));
    }

    if separator != "\\" {
        return problems;
    }

    if path.is_empty() {
        problems.push("Empty path".to_string());
        return problems;
    }

    let path_lower = path.to_lowercase();
    let first_segment = path_lower.split(separator).next().unwrap_or_default();

    if first_segment.starts_with("%%users.") && !WINDOWS_USERS_VARIABLES.contains(&first_segment) {
        problems.push(format!("Unsupported \"{}\" in path: {}", first_segment, path));
    } else if first_segment == "%%users.homedir%%" {
        problems.push(format!(
            "Replace \"%%users.homedir%%\" by \"%%users.userprofile%%\" in path: {}",
            path
        ));
    } else if let Some((_, prefix, replacement)) = WINDOWS_PREFIX_REPLACEMENTS
        .iter()
        .find(|(lower_prefix, _, _)| path_lower.starts_with(lower_prefix))
    {
        problems.push(format!(
            "Replace \"{}\" by \"{}\" in path: {}",
            prefix, replacement, path
        ));
    }

    problems
}

/// Checks a Windows Registry key path for the `%%CURRENT_CONTROL_SET%%`
/// variable, which is compared case-insensitively.
pub fn check_registry_key_path(key_path: &str) -> Option<String> {
    if key_path
        .to_uppercase()
        .starts_with(CURRENT_CONTROL_SET_VARIABLE)
    {
        return Some(format!(
            "Registry key path: {} starts with {}, replace it with HKEY_LOCAL_MACHINE\\System\\CurrentControlSet",
            key_path, CURRENT_CONTROL_SET_VARIABLE
        ));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn test_macos_private_pairs() {
        assert!(check_macos_paths(&paths(&["/etc/hosts", "/private/etc/hosts"]), "/").is_empty());
        assert!(check_macos_paths(&paths(&["/Users/*/Library", "Library"]), "/").is_empty());

        let problems = check_macos_paths(&paths(&["/private/etc/hosts"]), "/");
        assert_eq!(problems, vec!["Missing symbolic link: /etc/hosts for path: /private/etc/hosts"]);

        let problems = check_macos_paths(&paths(&["/tmp/*"]), "/");
        assert_eq!(problems, vec!["Missing path: /private/tmp/* for symbolic link: /tmp/*"]);
    }

    #[test]
    fn test_macos_unsupported_private_path() {
        let problems = check_macos_paths(&paths(&["/private/opt/x", "/private"]), "/");
        assert_eq!(problems.len(), 2);
        assert!(problems[0].starts_with("Unsupported private path: /private/opt/x"));
    }

    #[test]
    fn test_windows_separator() {
        let problems = check_windows_path("%%environ_systemroot%%\\System32", "/");
        assert_eq!(problems.len(), 1);
        assert!(problems[0].starts_with("Incorrect path separator"));

        assert!(check_windows_path("%%environ_systemroot%%\\System32", "\\").is_empty());
        assert!(check_windows_path("C:/Windows/System32", "/").is_empty());
    }

    #[test]
    fn test_windows_users_variables() {
        assert!(check_windows_path("%%users.appdata%%\\Microsoft", "\\").is_empty());

        let problems = check_windows_path("%%users.sid%%\\Microsoft", "\\");
        assert!(problems[0].contains("Unsupported \"%%users.sid%%\""));

        let problems = check_windows_path("%%users.homedir%%\\NTUSER.DAT", "\\");
        assert!(problems[0].contains("by \"%%users.userprofile%%\""));

        let problems = check_windows_path("%%users.userprofile%%\\AppData\\Local\\Temp", "\\");
        assert!(problems[0].contains("by \"%%users.localappdata%%\""));

        let problems = check_windows_path("%%USERS.USERPROFILE%%\\Application Data\\x", "\\");
        assert!(problems[0].contains("by \"%%users.appdata%%\""));
    }

    #[test]
    fn test_registry_key_path() {
        assert!(check_registry_key_path("HKEY_LOCAL_MACHINE\\System\\CurrentControlSet").is_none());
        assert!(check_registry_key_path("%%current_control_set%%\\Services").is_some());
    }
}
