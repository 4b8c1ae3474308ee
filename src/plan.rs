//! Plan-time normalization.
//!
//! Before a desired record is diffed against state or turned into a request
//! body it passes through a fixed pipeline: variant normalization, the kind's
//! own rewrites, mutual-exclusion rules, then schema defaults. Each step is
//! a pure function of the record and is idempotent, so running the pipeline
//! twice yields the same record as running it once.

use crate::diagnostics::Diagnostics;
use crate::discriminator::{Discriminator, Selection};
use crate::kind::ResourceKind;
use crate::reconcile::reconcile_set_order;
use crate::record::Record;
use crate::schema::{Block, Flavor};
use crate::value::{Attr, AttrValue};

/// Two attribute groups that cannot both reach the API.
///
/// When any dominant attribute is set, every subordinate attribute is
/// dropped from the plan and from request bodies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutualExclusion {
    /// Attributes that win.
    pub dominant: &'static [&'static str],
    /// Attributes that are discarded when a dominant attribute is set.
    pub subordinate: &'static [&'static str],
}

impl MutualExclusion {
    /// Declare a rule.
    pub const fn new(dominant: &'static [&'static str], subordinate: &'static [&'static str]) -> Self {
        Self {
            dominant,
            subordinate,
        }
    }

    /// Whether any dominant attribute is set to a non-empty value.
    pub fn dominant_present(&self, record: &Record) -> bool {
        self.dominant.iter().any(|name| record.is_set(name))
    }

    /// Null the subordinate group when the dominant group is present.
    ///
    /// Returns the subordinate attributes that held a value and were discarded.
    pub fn apply(&self, record: &mut Record) -> Vec<&'static str> {
        if !self.dominant_present(record) {
            return Vec::new();
        }
        let mut discarded = Vec::new();
        for name in self.subordinate {
            if record.is_set(name) {
                discarded.push(*name);
            }
            record.set_null(name);
        }
        discarded
    }
}

/// Run the full plan pipeline for `kind` over `plan`.
pub fn modify_plan(kind: &dyn ResourceKind, plan: &mut Record, diags: &mut Diagnostics) {
    let def = kind.definition();

    if let Some(discriminator) = &def.discriminator {
        normalize_variant(discriminator, plan, diags);
    }

    kind.modify_plan(plan, diags);

    for exclusion in &def.exclusions {
        for name in exclusion.apply(plan) {
            diags.warning(
                name,
                format!(
                    "{} is ignored because {} is set",
                    name,
                    exclusion.dominant.join(" / ")
                ),
            );
        }
    }

    apply_defaults(&def.schema.block, plan);
}

/// Null every attribute the selected variant forbids.
///
/// `Unknown` foreign attributes become `Null` silently; known ones produce
/// a warning. An unresolved or invalid discriminator leaves the plan as-is.
pub fn normalize_variant(discriminator: &Discriminator, plan: &mut Record, diags: &mut Diagnostics) {
    let variant = match discriminator.select(plan) {
        Ok(Selection::Variant(v)) => v.to_string(),
        Ok(Selection::Unresolved) | Err(_) => return,
    };
    for field in discriminator.foreign_fields(&variant) {
        if plan.is_set(field) {
            diags.warning(
                field,
                format!(
                    "{} does not apply when {} is {} and will be ignored",
                    field,
                    discriminator.attribute(),
                    variant
                ),
            );
        }
        plan.set_null(field);
    }
}

/// Fill `Null` attributes that declare a default.
pub fn apply_defaults(block: &Block, plan: &mut Record) {
    for (name, attr) in &block.attributes {
        let Some(default) = &attr.default else {
            continue;
        };
        if plan.get(name).is_null() {
            if let Some(value) = AttrValue::from_json(&attr.attr_type, default) {
                plan.set(name, Attr::Known(value));
            }
        }
    }
}

/// Give set-like lists the stored order when only their order changed.
///
/// The API does not order these lists, so a reordered configuration is no
/// change at all; planning it as one would never converge.
pub fn keep_set_order(block: &Block, prior: &Record, plan: &mut Record) {
    for (name, attr) in &block.attributes {
        if !attr.preserves_order() {
            continue;
        }
        let (Some(stored), Some(planned)) = (prior.get_list(name), plan.get_list(name)) else {
            continue;
        };
        let ordered = reconcile_set_order(stored, planned.to_vec());
        plan.set(name, Attr::Known(AttrValue::List(ordered)));
    }
}

/// Rewrite `Unknown` attributes the server never populates to `Null`.
///
/// Applies to optional-computed attributes flagged `not_echoed`; leaving
/// them `Unknown` would make apply fail to converge.
pub fn null_unechoed(block: &Block, plan: &mut Record) {
    for (name, attr) in &block.attributes {
        if attr.not_echoed
            && attr.flavor() == Flavor::OptionalComputed
            && plan.get(name).is_unknown()
        {
            plan.set_null(name);
        }
    }
}

/// Force `name` to `value` when `condition` holds.
///
/// Returns whether the attribute was changed. A warning is emitted when a
/// conflicting known value is overridden.
pub fn force_bool(
    plan: &mut Record,
    name: &str,
    value: bool,
    reason: &str,
    diags: &mut Diagnostics,
) -> bool {
    match plan.get(name) {
        Attr::Known(AttrValue::Bool(current)) if *current == value => false,
        Attr::Known(_) => {
            diags.warning(name, format!("{name} is forced to {value}: {reason}"));
            plan.set_known(name, value);
            true
        },
        Attr::Null | Attr::Unknown => {
            plan.set_known(name, value);
            true
        },
    }
}

/// Null `dependent` when the boolean `flag` is known to be false.
pub fn gate_on_flag(plan: &mut Record, flag: &str, dependent: &str) {
    if plan.get_bool(flag) == Some(false) {
        plan.set_null(dependent);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discriminator::Variant;
    use crate::kind::{Identity, KindDefinition};
    use crate::schema::{Attribute, Schema};
    use crate::transport::ApiPath;
    use serde_json::json;

    #[derive(Debug, Clone, Copy)]
    enum Mode {
        Local,
        Remote,
    }

    impl Variant for Mode {
        const ATTRIBUTE: &'static str = "mode";

        fn all() -> &'static [Self] {
            &[Mode::Local, Mode::Remote]
        }

        fn name(&self) -> &'static str {
            match self {
                Mode::Local => "local",
                Mode::Remote => "remote",
            }
        }

        fn fields(&self) -> &'static [&'static str] {
            match self {
                Mode::Local => &["path"],
                Mode::Remote => &["host", "port"],
            }
        }
    }

    struct Widget(KindDefinition);

    impl ResourceKind for Widget {
        fn definition(&self) -> &KindDefinition {
            &self.0
        }
    }

    fn widget() -> Widget {
        let schema = Schema::v0()
            .with_attribute("id", Attribute::computed_string())
            .with_attribute("mode", Attribute::required_string())
            .with_attribute("path", Attribute::optional_string())
            .with_attribute("host", Attribute::optional_string())
            .with_attribute("port", Attribute::optional_int64())
            .with_attribute("role_arn", Attribute::optional_string())
            .with_attribute("access_key", Attribute::optional_string())
            .with_attribute("tier", Attribute::optional_string().with_default(json!("standard")));
        Widget(
            KindDefinition::new("widget", ApiPath::new("/widget"), Identity::plain("widgetId"), schema)
                .with_discriminator(Discriminator::of::<Mode>())
                .with_exclusion(MutualExclusion::new(&["role_arn"], &["access_key"])),
        )
    }

    #[test]
    fn test_variant_normalization() {
        let mut plan = Record::new()
            .with("mode", "local")
            .with("path", "/data")
            .with("host", "h")
            .with_attr("port", Attr::Unknown);
        let mut diags = Diagnostics::new();
        normalize_variant(&Discriminator::of::<Mode>(), &mut plan, &mut diags);

        assert_eq!(plan.get_str("path"), Some("/data"));
        assert!(plan.get("host").is_null());
        assert!(plan.get("port").is_null());
        assert_eq!(diags.len(), 1);
        assert!(!diags.has_errors());
    }

    #[test]
    fn test_exclusion_discards_subordinate() {
        let rule = MutualExclusion::new(&["role_arn"], &["access_key"]);
        let mut plan = Record::new().with("role_arn", "arn").with("access_key", "AK");
        assert_eq!(rule.apply(&mut plan), vec!["access_key"]);
        assert!(plan.get("access_key").is_null());

        let mut plan = Record::new().with("role_arn", "").with("access_key", "AK");
        assert!(rule.apply(&mut plan).is_empty());
        assert_eq!(plan.get_str("access_key"), Some("AK"));
    }

    #[test]
    fn test_pipeline_applies_defaults() {
        let kind = widget();
        let mut plan = Record::new().with("mode", "remote").with("host", "h");
        let mut diags = Diagnostics::new();
        modify_plan(&kind, &mut plan, &mut diags);
        assert_eq!(plan.get_str("tier"), Some("standard"));
        assert!(diags.is_empty());
    }

    #[test]
    fn test_pipeline_is_idempotent() {
        let kind = widget();
        let mut plan = Record::new()
            .with("mode", "remote")
            .with("path", "/x")
            .with("role_arn", "arn")
            .with("access_key", "AK")
            .with_attr("id", Attr::Unknown);
        let mut diags = Diagnostics::new();
        modify_plan(&kind, &mut plan, &mut diags);
        let once = plan.clone();
        modify_plan(&kind, &mut plan, &mut Diagnostics::new());
        assert_eq!(plan, once);
        assert_eq!(diags.len(), 2);
    }

    #[test]
    fn test_null_unechoed() {
        let block = Block::new()
            .with_attribute("visibility", Attribute::optional_computed_int64().not_echoed())
            .with_attribute("state", Attribute::optional_computed_string());
        let mut plan = Record::new()
            .with_attr("visibility", Attr::Unknown)
            .with_attr("state", Attr::Unknown);
        null_unechoed(&block, &mut plan);
        assert!(plan.get("visibility").is_null());
        assert!(plan.get("state").is_unknown());
    }

    #[test]
    fn test_force_bool() {
        let mut diags = Diagnostics::new();
        let mut plan = Record::new().with_attr("flag", Attr::Unknown);
        assert!(force_bool(&mut plan, "flag", true, "required", &mut diags));
        assert_eq!(plan.get_bool("flag"), Some(true));
        assert!(!force_bool(&mut plan, "flag", true, "required", &mut diags));
        assert!(diags.is_empty());

        let mut plan = Record::new().with("flag", false);
        assert!(force_bool(&mut plan, "flag", true, "required", &mut diags));
        assert_eq!(diags.len(), 1);
    }

    #[test]
    fn test_keep_set_order() {
        let block = Block::new()
            .with_attribute("refs", Attribute::optional_string_set())
            .with_attribute("steps", Attribute::optional_string_list());
        let prior = Record::new()
            .with("refs", vec!["a", "b", "c"])
            .with("steps", vec!["a", "b"]);

        let mut plan = Record::new()
            .with("refs", vec!["c", "b", "a"])
            .with("steps", vec!["b", "a"]);
        keep_set_order(&block, &prior, &mut plan);
        assert_eq!(plan.get_strings("refs"), Some(vec!["a", "b", "c"]));
        assert_eq!(plan.get_strings("steps"), Some(vec!["b", "a"]));

        let mut plan = Record::new().with("refs", vec!["d", "a"]);
        keep_set_order(&block, &prior, &mut plan);
        assert_eq!(plan.get_strings("refs"), Some(vec!["d", "a"]));

        let mut plan = Record::new().with_attr("refs", Attr::Unknown);
        keep_set_order(&block, &prior, &mut plan);
        assert!(plan.get("refs").is_unknown());
    }

    #[test]
    fn test_gate_on_flag() {
        let mut plan = Record::new().with("enabled", false).with("seconds", 30);
        gate_on_flag(&mut plan, "enabled", "seconds");
        assert!(plan.get("seconds").is_null());

        let mut plan = Record::new().with_attr("enabled", Attr::Unknown).with("seconds", 30);
        gate_on_flag(&mut plan, "enabled", "seconds");
        assert_eq!(plan.get_i64("seconds"), Some(30));
    }
}
