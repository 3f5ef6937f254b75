use tabled::builder::Builder;
use tabled::settings::Style;

use crate::instance::Instance;

/// Renders the `list` table: id, state, launch date and best address.
#[must_use]
pub fn instance_table(instances: &[Instance]) -> String {
    let mut builder = Builder::default();
    builder.push_record(["Instance ID", "State", "Launch Date", "Hostname"]);
    for instance in instances {
        builder.push_record([
            instance.id(),
            instance.state(),
            instance.launch_date().unwrap_or_default(),
            instance.display_address(),
        ]);
    }
    render(builder)
}

/// Renders the numbered table shown when asking which instance to use.
#[must_use]
pub fn selection_table(instances: &[Instance]) -> String {
    let mut builder = Builder::default();
    builder.push_record(["#", "Location", "Name", "Hostname"]);
    for (index, instance) in instances.iter().enumerate() {
        let hostname = instance
            .hostname()
            .or_else(|| instance.private_address())
            .unwrap_or_default();
        builder.push_record([
            (index + 1).to_string(),
            instance.location().to_owned(),
            abbreviate(instance.name(), 50),
            hostname.to_owned(),
        ]);
    }
    render(builder)
}

fn render(builder: Builder) -> String {
    let mut table = builder.build();
    table.with(Style::sharp());
    table.to_string()
}

/// Cuts the middle out of long values so both ends stay visible.
fn abbreviate(value: &str, max: usize) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= max + 3 {
        return value.to_owned();
    }

    let overage = chars.len() - max;
    let start = (chars.len() - overage) / 2;
    let end = start + overage;

    let head: String = chars[..start].iter().collect();
    let tail: String = chars[end..].iter().collect();
    format!("{head} .. {tail}")
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("short", 50, "short")]
    #[case("abcdefghij", 7, "abcdefghij")]
    #[case("abcdefghijkl", 6, "abc .. jkl")]
    fn abbreviate_works(#[case] value: &str, #[case] max: usize, #[case] should: &str) {
        assert_eq!(abbreviate(value, max), should);
    }

    #[test]
    fn selection_table_numbers_rows_from_one() {
        let instances = vec![
            Instance::builder()
                .id("i-1")
                .name("web-1")
                .location("us-east")
                .private_address("10.0.0.5")
                .build(),
            Instance::builder()
                .id("i-2")
                .name("web-2")
                .location("us-west")
                .hostname("web-2.example.com")
                .build(),
        ];
        let table = selection_table(&instances);
        let rows: Vec<&str> = table.lines().filter(|line| line.contains("web-")).collect();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].contains(" 1 ") && rows[0].contains("10.0.0.5"));
        assert!(rows[1].contains(" 2 ") && rows[1].contains("web-2.example.com"));
    }

    #[test]
    fn instance_table_shows_best_address() {
        let instances = vec![Instance::builder()
            .id("i-1")
            .state("running")
            .launch_date("2019-06-01")
            .private_address("10.0.0.5")
            .public_address("1.2.3.4")
            .build()];
        let table = instance_table(&instances);
        assert!(table.contains("Instance ID"));
        assert!(table.contains("running"));
        assert!(table.contains("2019-06-01"));
        assert!(table.contains("1.2.3.4"));
        assert!(!table.contains("10.0.0.5"));
    }
}
