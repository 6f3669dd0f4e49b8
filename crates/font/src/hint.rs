//! Install suggestions for hosts with no CJK font.

/// Suggest an install command for the host's package manager.
///
/// Probes in a fixed priority order (Debian, yum, dnf, Homebrew) and
/// always ends with a generic fallback, so the hint is never empty.
pub fn install_hint() -> String {
    let specific = if which::which("apt-get").is_ok() || which::which("apt").is_ok() {
        Some("apt-get install -y fonts-noto-cjk")
    } else if which::which("yum").is_ok() {
        Some("yum install -y google-noto-sans-cjk-sc-fonts")
    } else if which::which("dnf").is_ok() {
        Some("dnf install -y google-noto-sans-cjk-sc-fonts")
    } else if which::which("brew").is_ok() {
        Some("brew install font-noto-sans-cjk-sc")
    } else {
        None
    };

    match specific {
        Some(cmd) => format!("{} (or drop a Noto CJK .ttf/.otf into ./fonts)", cmd),
        None => "install a Noto CJK font package for your platform, or drop a .ttf/.otf into ./fonts"
            .to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hint_is_never_empty() {
        let hint = install_hint();
        assert!(!hint.is_empty());
        assert!(hint.to_lowercase().contains("noto"));
    }
}
