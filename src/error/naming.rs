//! Constraint naming convention. Every index and constraint the bootstrap DDL creates is named
//! from these templates, so a bare constraint name is enough to recover what kind of constraint
//! failed when the driver reports a generic integrity violation.

use regex::Regex;
use std::sync::LazyLock;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NamingConvention {
    Index,
    Unique,
    Check,
    PrimaryKey,
    ForeignKey,
}

static PATTERNS: LazyLock<[(NamingConvention, Regex); 5]> = LazyLock::new(|| {
    let compile = |p: &str| Regex::new(p).expect("naming convention pattern");
    [
        (
            NamingConvention::Index,
            compile(r"^ix_(?P<table_name>.+)_(?P<column_0_name>.+)$"),
        ),
        (
            NamingConvention::Unique,
            compile(r"^uq_(?P<table_name>.+)_(?P<column_0_name>.+)$"),
        ),
        (
            NamingConvention::Check,
            compile(r"^ck_(?P<table_name>.+)_(?P<constraint_name>.+)$"),
        ),
        (NamingConvention::PrimaryKey, compile(r"^pk_(?P<table_name>.+)$")),
        (
            NamingConvention::ForeignKey,
            compile(r"^fk_(?P<table_name>.+)_(?P<column_0_name>.+)_(?P<referred_table_name>.+)$"),
        ),
    ]
});

impl NamingConvention {
    /// Matching order.
    pub const ALL: [NamingConvention; 5] = [
        NamingConvention::Index,
        NamingConvention::Unique,
        NamingConvention::Check,
        NamingConvention::PrimaryKey,
        NamingConvention::ForeignKey,
    ];

    pub fn prefix(self) -> &'static str {
        match self {
            NamingConvention::Index => "ix",
            NamingConvention::Unique => "uq",
            NamingConvention::Check => "ck",
            NamingConvention::PrimaryKey => "pk",
            NamingConvention::ForeignKey => "fk",
        }
    }

    pub fn template(self) -> &'static str {
        match self {
            NamingConvention::Index => "ix_{table_name}_{column_0_name}",
            NamingConvention::Unique => "uq_{table_name}_{column_0_name}",
            NamingConvention::Check => "ck_{table_name}_{constraint_name}",
            NamingConvention::PrimaryKey => "pk_{table_name}",
            NamingConvention::ForeignKey => "fk_{table_name}_{column_0_name}_{referred_table_name}",
        }
    }

    /// Render a constraint name. Unknown placeholders are left as-is.
    pub fn render(self, parts: &[(&str, &str)]) -> String {
        parts.iter().fold(self.template().to_string(), |name, (key, value)| {
            name.replace(&format!("{{{}}}", key), value)
        })
    }

    /// Recover the convention and its parts from a constraint name.
    pub fn parse(name: &str) -> Option<ConstraintName> {
        PATTERNS.iter().find_map(|(convention, re)| {
            let caps = re.captures(name)?;
            let group = |g: &str| caps.name(g).map(|m| m.as_str().to_string());
            Some(ConstraintName {
                convention: *convention,
                table_name: group("table_name").unwrap_or_default(),
                column_name: group("column_0_name"),
                referred_table_name: group("referred_table_name"),
                constraint_name: group("constraint_name"),
            })
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConstraintName {
    pub convention: NamingConvention,
    pub table_name: String,
    pub column_name: Option<String>,
    pub referred_table_name: Option<String>,
    pub constraint_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_fills_template() {
        assert_eq!(
            NamingConvention::ForeignKey.render(&[
                ("table_name", "device"),
                ("column_0_name", "config_node_id"),
                ("referred_table_name", "confignode"),
            ]),
            "fk_device_config_node_id_confignode"
        );
        assert_eq!(
            NamingConvention::PrimaryKey.render(&[("table_name", "confignode")]),
            "pk_confignode"
        );
    }

    #[test]
    fn parse_recovers_kind() {
        let c = NamingConvention::parse("uq_device_identifier").unwrap();
        assert_eq!(c.convention, NamingConvention::Unique);

        let c = NamingConvention::parse("ck_confignode_name_not_blank").unwrap();
        assert_eq!(c.convention, NamingConvention::Check);
        assert_eq!(c.table_name, "confignode_name_not");
        assert_eq!(c.constraint_name.as_deref(), Some("blank"));

        let c = NamingConvention::parse("pk_device").unwrap();
        assert_eq!(c.convention, NamingConvention::PrimaryKey);
        assert_eq!(c.table_name, "device");

        assert!(NamingConvention::parse("device_name_key").is_none());
    }

    #[test]
    fn foreign_key_yields_referred_table() {
        let c = NamingConvention::parse("fk_device_config_node_id_confignode").unwrap();
        assert_eq!(c.convention, NamingConvention::ForeignKey);
        assert_eq!(c.referred_table_name.as_deref(), Some("confignode"));
    }

    #[test]
    fn index_is_tried_first() {
        let c = NamingConvention::parse("ix_confignode_name").unwrap();
        assert_eq!(c.convention, NamingConvention::Index);
        assert_eq!(c.table_name, "confignode");
        assert_eq!(c.column_name.as_deref(), Some("name"));
    }
}
