use crate::models::Severity;

const HIGH_RISK: &[&str] = &[".bak", ".sql", ".env", ".config", ".php", ".ini"];
const MEDIUM_RISK: &[&str] = &[".log", ".txt", ".zip"];

pub fn classify_severity(path: &str) -> Severity {
    let lower = path.to_lowercase();

    if HIGH_RISK.iter().any(|ext| lower.ends_with(ext)) {
        Severity::High
    } else if MEDIUM_RISK.iter().any(|ext| lower.ends_with(ext)) {
        Severity::Medium
    } else {
        Severity::Low
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_high_risk() {
        assert_eq!(classify_severity(".env"), Severity::High);
        assert_eq!(classify_severity("db.sql"), Severity::High);
        assert_eq!(classify_severity("index.php"), Severity::High);
    }

    #[test]
    fn test_medium_risk() {
        assert_eq!(classify_severity("notes.txt"), Severity::Medium);
        assert_eq!(classify_severity("error.log"), Severity::Medium);
    }

    #[test]
    fn test_low_risk() {
        assert_eq!(classify_severity("page"), Severity::Low);
        assert_eq!(classify_severity("admin/"), Severity::Low);
        assert_eq!(classify_severity("index.html"), Severity::Low);
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(classify_severity("FILE.BAK"), Severity::High);
        assert_eq!(classify_severity("Readme.TXT"), Severity::Medium);
    }
}
