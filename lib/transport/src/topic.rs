/// Checks a concrete topic name against a subscription filter using the MQTT
/// wildcard rules: `+` matches exactly one level, a trailing `#` matches the
/// parent level and everything below it.
pub fn topic_matches(filter: &str, topic: &str) -> bool {
    // wildcards never match broker-internal topics such as `$SYS/...`
    if topic.starts_with('$') && (filter.starts_with('+') || filter.starts_with('#')) {
        return false;
    }

    let mut filter_levels = filter.split('/');
    let mut topic_levels = topic.split('/');

    loop {
        match (filter_levels.next(), topic_levels.next()) {
            (Some("#"), _) => return filter_levels.next().is_none(),
            (Some("+"), Some(_)) => continue,
            (Some(expected), Some(level)) if expected == level => continue,
            (None, None) => return true,
            _ => return false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match() {
        assert!(topic_matches("/class/idgs09/ABC123", "/class/idgs09/ABC123"));
        assert!(!topic_matches("/class/idgs09/ABC123", "/class/idgs09/ABC124"));
        assert!(!topic_matches("/class/idgs09", "/class/idgs09/ABC123"));
        assert!(!topic_matches("/class/idgs09/ABC123", "/class/idgs09"));
    }

    #[test]
    fn test_single_level_wildcard() {
        assert!(topic_matches("/class/idgs09/+", "/class/idgs09/ABC123"));
        assert!(topic_matches("/class/+/ABC123", "/class/idgs09/ABC123"));
        assert!(topic_matches("/class/idgs09/+", "/class/idgs09/"));
        assert!(!topic_matches("/class/idgs09/+", "/class/idgs09/ABC123/extra"));
        assert!(!topic_matches("/class/idgs09/+", "/class/idgs09"));
    }

    #[test]
    fn test_multi_level_wildcard() {
        assert!(topic_matches("/class/#", "/class/idgs09/ABC123"));
        assert!(topic_matches("/class/#", "/class"));
        assert!(topic_matches("#", "sensors/kitchen"));
        assert!(!topic_matches("/class/#", "/other/idgs09"));
        assert!(!topic_matches("/class/#/ABC123", "/class/idgs09/ABC123"));
    }

    #[test]
    fn test_system_topics() {
        assert!(!topic_matches("#", "$SYS/broker/uptime"));
        assert!(!topic_matches("+/broker/uptime", "$SYS/broker/uptime"));
        assert!(topic_matches("$SYS/#", "$SYS/broker/uptime"));
    }
}
