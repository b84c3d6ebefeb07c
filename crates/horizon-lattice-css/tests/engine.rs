//! End-to-end tests for processing, naming and activation.

use horizon_lattice_css::container::ScopeState;
use horizon_lattice_css::prelude::*;
use horizon_lattice_css::value::{NameCell, NameForm, NameRef};
use pretty_assertions::assert_eq;

#[derive(Default)]
struct Tokens;

impl StyleDefinition for Tokens {
    fn define(&self, rules: &mut RuleBuilder<'_>) -> Result<()> {
        rules.typed_var("accent", "color", 0xff0000);
        rules.var("gap", LENGTH.units(0.5, "rem"));
        Ok(())
    }
}

#[derive(Default)]
struct Card;

impl StyleDefinition for Card {
    fn define(&self, rules: &mut RuleBuilder<'_>) -> Result<()> {
        let tokens = rules.use_definition::<Tokens>()?;
        let accent = tokens.require("accent")?.clone();
        let gap = tokens.require("gap")?.clone();

        let fade = rules.keyframes(
            "fade",
            [
                Keyframe::new(Waypoint::From, Styleset::new().set("opacity", 0)),
                Keyframe::new(Waypoint::To, Styleset::new().set("opacity", 1)),
            ],
        );
        rules.class(
            "card",
            Styleset::new()
                .set("border-color", &accent)
                .set("gap", &gap)
                .set("animation-name", &fade),
        );
        Ok(())
    }
}

#[derive(Default)]
struct Header;

impl StyleDefinition for Header {
    fn define(&self, rules: &mut RuleBuilder<'_>) -> Result<()> {
        rules.class("title", Styleset::new().set("font-weight", 700));
        Ok(())
    }
}

#[derive(Default)]
struct Footer;

impl StyleDefinition for Footer {
    fn define(&self, rules: &mut RuleBuilder<'_>) -> Result<()> {
        rules.class("title", Styleset::new().set("font-size", 12));
        Ok(())
    }
}

#[derive(Default)]
struct BaseButton;

impl StyleDefinition for BaseButton {
    fn define(&self, rules: &mut RuleBuilder<'_>) -> Result<()> {
        rules.class("button", Styleset::new().set("color", "red").set("padding", 4));
        rules.class("label", Styleset::new().set("font-size", 14));
        Ok(())
    }
}

#[derive(Default)]
struct DangerButton;

impl StyleDefinition for DangerButton {
    fn define(&self, rules: &mut RuleBuilder<'_>) -> Result<()> {
        rules.extend::<BaseButton>()?;
        rules.class("button", Styleset::new().set("color", "darkred"));
        rules.class("icon", Styleset::new().set("width", 16));
        Ok(())
    }
}

#[derive(Default)]
struct Layout;

impl StyleDefinition for Layout {
    fn define(&self, rules: &mut RuleBuilder<'_>) -> Result<()> {
        rules.class("wide", Styleset::new().set("display", "block"));
        rules.supports("(display: grid)", |rules| {
            rules.class("grid", Styleset::new().set("display", "grid"));
            Ok(())
        })?;
        rules.media("(max-width: 600px)", |rules| {
            let wide = rules.class("wide", Styleset::new().set("display", "flex"));
            rules.style(
                Selector::new().class(&wide).text(" > *"),
                Styleset::new().set("margin", 0),
            );
            Ok(())
        })?;
        Ok(())
    }
}

#[derive(Default)]
struct Broken;

impl StyleDefinition for Broken {
    fn define(&self, rules: &mut RuleBuilder<'_>) -> Result<()> {
        rules.class("never", Styleset::new().set("color", "red"));
        let tokens = rules.use_definition::<Tokens>()?;
        tokens.require("missing")?;
        Ok(())
    }
}

#[derive(Default)]
struct Ping;

impl StyleDefinition for Ping {
    fn define(&self, rules: &mut RuleBuilder<'_>) -> Result<()> {
        rules.use_definition::<Pong>()?;
        Ok(())
    }
}

#[derive(Default)]
struct Pong;

impl StyleDefinition for Pong {
    fn define(&self, rules: &mut RuleBuilder<'_>) -> Result<()> {
        rules.use_definition::<Ping>()?;
        Ok(())
    }
}

struct Chip;

impl StyleDefinition for Chip {
    fn define(&self, rules: &mut RuleBuilder<'_>) -> Result<()> {
        rules.class("label", Styleset::new().set("padding", 2));
        Ok(())
    }

    fn is_multiplex(&self) -> bool {
        true
    }
}

#[derive(Default)]
struct Cloned;

impl StyleDefinition for Cloned {
    fn define(&self, rules: &mut RuleBuilder<'_>) -> Result<()> {
        let rule = Rule::class(Styleset::new().set("color", "red"));
        let first = rules.add("first", rule.clone());
        let second = rules.add("second", rule);
        rules.style(
            Selector::new().class(&first).text(" ").class(&second),
            Styleset::new().set("margin", 0),
        );
        Ok(())
    }
}

#[derive(Default)]
struct Dangling;

impl StyleDefinition for Dangling {
    fn define(&self, rules: &mut RuleBuilder<'_>) -> Result<()> {
        rules.use_definition::<Tokens>()?;
        let ghost = NameRef::new("ghost", NameCell::default(), NameForm::Class);
        rules.style(Selector::new().rule(ghost), Styleset::new().set("color", "red"));
        Ok(())
    }
}

#[derive(Default)]
struct Panel;

impl StyleDefinition for Panel {
    fn define(&self, rules: &mut RuleBuilder<'_>) -> Result<()> {
        rules.use_definition::<Header>()?;
        rules.use_definition::<Dangling>()?;
        rules.class("panel", Styleset::new().set("padding", 4));
        Ok(())
    }
}

#[derive(Default)]
struct Outer;

impl StyleDefinition for Outer {
    fn define(&self, rules: &mut RuleBuilder<'_>) -> Result<()> {
        rules.class("b_c", Styleset::new().set("color", "red"));
        Ok(())
    }

    fn scope_name(&self) -> String {
        "A".to_string()
    }
}

#[derive(Default)]
struct Inner;

impl StyleDefinition for Inner {
    fn define(&self, rules: &mut RuleBuilder<'_>) -> Result<()> {
        rules.class("c", Styleset::new().set("color", "blue"));
        Ok(())
    }

    fn scope_name(&self) -> String {
        "A_b".to_string()
    }
}

#[derive(Default)]
struct SecondCard;

impl StyleDefinition for SecondCard {
    fn define(&self, rules: &mut RuleBuilder<'_>) -> Result<()> {
        rules.class("card", Styleset::new().set("margin", 2));
        Ok(())
    }

    fn scope_name(&self) -> String {
        "Card".to_string()
    }
}

#[derive(Default)]
struct ExplicitCard;

impl StyleDefinition for ExplicitCard {
    fn define(&self, rules: &mut RuleBuilder<'_>) -> Result<()> {
        rules.class("card", Styleset::new().set("margin", 3));
        Ok(())
    }

    fn scope_name(&self) -> String {
        "Card_1".to_string()
    }
}

#[test]
fn names_round_trip_through_values() {
    let mut engine = StyleEngine::new();
    let id = engine.process::<Card>().unwrap();
    let scope = engine.scope(id).unwrap();

    assert_eq!(scope.name(), "Card");
    assert_eq!(scope.name_of("card"), Some("Card_card"));
    assert_eq!(scope.name_of("fade"), Some("Card_fade"));
    assert_eq!(scope.get("card").unwrap().name(), Some("Card_card"));

    assert_eq!(
        engine.render(id).unwrap(),
        "@keyframes Card_fade{from{opacity:0;}to{opacity:1;}}\
         .Card_card{border-color:var(--Tokens_accent);gap:var(--Tokens_gap);animation-name:Card_fade;}"
    );
}

#[test]
fn custom_properties_render_under_root() {
    let mut engine = StyleEngine::new();
    let id = engine.process::<Tokens>().unwrap();
    assert_eq!(
        engine.serialize(id).unwrap(),
        [":root{--Tokens_accent:#ff0000;--Tokens_gap:0.5rem;}"]
    );
}

#[test]
fn sibling_scopes_get_distinct_names() {
    let mut engine = StyleEngine::new();
    let header = engine.process::<Header>().unwrap();
    let footer = engine.process::<Footer>().unwrap();

    assert_eq!(engine.render(header).unwrap(), ".Header_title{font-weight:700;}");
    assert_eq!(engine.render(footer).unwrap(), ".Footer_title{font-size:12px;}");
}

#[test]
fn extended_definitions_keep_base_names() {
    let mut engine = StyleEngine::new();
    let danger = engine.process::<DangerButton>().unwrap();
    let base = engine.scope_of::<BaseButton>().unwrap();

    assert_eq!(engine.scope(danger).unwrap().base(), Some(base));
    assert_eq!(
        engine.render(base).unwrap(),
        ".BaseButton_button{color:red;padding:4px;}.BaseButton_label{font-size:14px;}"
    );
    assert_eq!(
        engine.render(danger).unwrap(),
        ".BaseButton_button{color:darkred;}.BaseButton_label{font-size:14px;}.DangerButton_icon{width:16px;}"
    );
}

#[test]
fn supports_groups_follow_the_feature_predicate() {
    let mut engine = StyleEngine::new();
    let id = engine.process::<Layout>().unwrap();

    let media = "@media (max-width: 600px){.Layout_wide{display:flex;}.Layout_wide > *{margin:0px;}}";
    assert_eq!(
        engine.render(id).unwrap(),
        format!(".Layout_wide{{display:block;}}@supports (display: grid){{.Layout_grid{{display:grid;}}}}{media}")
    );

    engine.set_feature_support(|query: &str| !query.contains("grid"));
    assert_eq!(
        engine.render(id).unwrap(),
        format!(".Layout_wide{{display:block;}}{media}")
    );
}

#[test]
fn rendering_is_idempotent() {
    let mut engine = StyleEngine::new();
    let first = engine.process::<Layout>().unwrap();
    let text = engine.render(first).unwrap();
    let again = engine.process::<Layout>().unwrap();

    assert_eq!(first, again);
    assert_eq!(engine.render(again).unwrap(), text);
}

#[test]
fn activation_inserts_references_first_and_counts_users() {
    let mut engine = StyleEngine::new();
    let mut sink = StringSink::new();

    let tokens = engine.activate_definition::<Tokens>(&mut sink).unwrap();
    let card = engine.activate_definition::<Card>(&mut sink).unwrap();
    assert_eq!(engine.scope(tokens).unwrap().ref_count(), 2);
    assert_eq!(sink.len(), 3);

    engine.deactivate(card, &mut sink).unwrap();
    assert_eq!(engine.scope(card).unwrap().state(), ScopeState::Cleared);
    assert_eq!(engine.scope(tokens).unwrap().ref_count(), 1);
    assert_eq!(sink.css(), ":root{--Tokens_accent:#ff0000;--Tokens_gap:0.5rem;}");

    engine.deactivate(tokens, &mut sink).unwrap();
    assert!(sink.is_empty());

    // Deactivating an inactive scope is a no-op.
    engine.deactivate(tokens, &mut sink).unwrap();
    assert_eq!(engine.scope(tokens).unwrap().ref_count(), 0);
}

#[test]
fn reactivation_inserts_the_same_text() {
    let mut engine = StyleEngine::new();
    let mut sink = StringSink::new();

    let card = engine.activate_definition::<Card>(&mut sink).unwrap();
    let text = sink.css();
    engine.deactivate(card, &mut sink).unwrap();
    assert!(sink.is_empty());

    engine.activate(card, &mut sink).unwrap();
    assert_eq!(sink.css(), text);
}

#[test]
fn sinks_receive_identical_text() {
    let mut strings = StringSink::new();
    let mut sheet = SheetSink::new();

    let mut first = StyleEngine::new();
    first.activate_definition::<Card>(&mut strings).unwrap();
    first.activate_definition::<Layout>(&mut strings).unwrap();

    let mut second = StyleEngine::new();
    let card = second.activate_definition::<Card>(&mut sheet).unwrap();
    second.activate_definition::<Layout>(&mut sheet).unwrap();

    assert_eq!(sheet.css(), strings.css());
    assert_eq!(sheet.scope_count(), 3);
    assert_eq!(sheet.rules(card).len(), 2);
}

#[test]
fn optimized_names_from_configuration() {
    let config = EngineConfig::from_toml_str(
        r#"
        [naming]
        mode = "optimized"
        prefix = "x"
        "#,
    )
    .unwrap();
    let mut engine = StyleEngine::with_config(&config);

    let header = engine.process::<Header>().unwrap();
    let footer = engine.process::<Footer>().unwrap();
    assert_eq!(engine.render(header).unwrap(), ".x1{font-weight:700;}");
    assert_eq!(engine.render(footer).unwrap(), ".x2{font-size:12px;}");
}

#[test]
fn switching_to_optimized_keeps_assigned_names() {
    let mut engine = StyleEngine::new();
    let header = engine.process::<Header>().unwrap();
    engine.naming_mut().use_optimized("h");
    let footer = engine.process::<Footer>().unwrap();

    assert_eq!(engine.render(header).unwrap(), ".Header_title{font-weight:700;}");
    assert_eq!(engine.render(footer).unwrap(), ".h1{font-size:12px;}");
}

#[test]
fn multiplex_definitions_get_fresh_scopes() {
    let mut engine = StyleEngine::new();
    let first = engine.process_instance(Chip).unwrap();
    let second = engine.process_instance(Chip).unwrap();

    assert_ne!(first, second);
    assert_eq!(engine.render(first).unwrap(), ".Chip_1_label{padding:2px;}");
    assert_eq!(engine.render(second).unwrap(), ".Chip_2_label{padding:2px;}");
}

#[test]
fn failed_definition_is_discarded_without_affecting_others() {
    let subscriber = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .finish();

    tracing::subscriber::with_default(subscriber, || {
        let mut engine = StyleEngine::new();
        let header = engine.process::<Header>().unwrap();

        let err = engine.process::<Broken>().unwrap_err();
        match err {
            Error::DefinitionConstruction { definition, message } => {
                assert_eq!(definition, "Broken");
                assert!(message.contains("missing"), "{message}");
            }
            other => panic!("unexpected error: {other}"),
        }

        assert!(engine.scope_of::<Broken>().is_none());
        assert!(engine.scope_of::<Tokens>().is_some());
        assert_eq!(engine.scope_count(), 2);
        assert_eq!(engine.render(header).unwrap(), ".Header_title{font-weight:700;}");
    });
}

#[test]
fn mutual_use_is_a_cycle() {
    let mut engine = StyleEngine::new();
    let err = engine.process::<Ping>().unwrap_err();

    assert!(matches!(err, Error::DefinitionCycle { ref definition } if definition == "Ping"));
    assert_eq!(engine.scope_count(), 0);
    assert!(engine.process::<Header>().is_ok());
}

#[test]
fn shared_engine_across_threads() {
    let shared = StyleEngine::new().into_shared();
    let worker = {
        let shared = shared.clone();
        std::thread::spawn(move || shared.lock().process::<Header>().unwrap())
    };
    let id = worker.join().unwrap();
    assert_eq!(shared.lock().render(id).unwrap(), ".Header_title{font-weight:700;}");
}

#[test]
fn cloned_rules_get_their_own_names() {
    let mut engine = StyleEngine::new();
    let id = engine.process::<Cloned>().unwrap();
    let scope = engine.scope(id).unwrap();

    assert_eq!(scope.get("first").unwrap().name(), Some("Cloned_first"));
    assert_eq!(scope.get("second").unwrap().name(), Some("Cloned_second"));
    assert_eq!(
        engine.render(id).unwrap(),
        ".Cloned_first{color:red;}.Cloned_second{color:red;}.Cloned_first .Cloned_second{margin:0px;}"
    );
}

#[test]
fn failed_activation_leaves_nothing_active() {
    let mut engine = StyleEngine::new();
    let mut sink = StringSink::new();

    let err = engine.activate_definition::<Dangling>(&mut sink).unwrap_err();
    assert!(matches!(err, Error::UnassignedName { .. }));
    let tokens = engine.scope_of::<Tokens>().unwrap();
    assert_eq!(engine.scope(tokens).unwrap().ref_count(), 0);
    assert!(sink.is_empty());

    let err = engine.activate_definition::<Panel>(&mut sink).unwrap_err();
    assert!(matches!(err, Error::UnassignedName { .. }));
    let header = engine.scope_of::<Header>().unwrap();
    assert_eq!(engine.scope(header).unwrap().ref_count(), 0);
    assert_eq!(engine.scope(header).unwrap().state(), ScopeState::Cleared);
    assert!(sink.is_empty());
}

#[test]
fn readable_names_that_join_alike_stay_distinct() {
    let mut engine = StyleEngine::new();
    let outer = engine.process::<Outer>().unwrap();
    let inner = engine.process::<Inner>().unwrap();

    assert_eq!(engine.render(outer).unwrap(), ".A_b_c{color:red;}");
    assert_eq!(engine.render(inner).unwrap(), ".A_b_c_1{color:blue;}");
}

#[test]
fn suffixed_scope_names_do_not_clash_with_declared_ones() {
    let mut engine = StyleEngine::new();
    engine.process::<Card>().unwrap();
    let second = engine.process::<SecondCard>().unwrap();
    let explicit = engine.process::<ExplicitCard>().unwrap();

    assert_eq!(engine.scope(second).unwrap().name(), "Card_1");
    assert_ne!(engine.scope(explicit).unwrap().name(), "Card_1");
    assert_eq!(engine.render(second).unwrap(), ".Card_1_card{margin:2px;}");
    assert_ne!(
        engine.scope(explicit).unwrap().name_of("card"),
        Some("Card_1_card")
    );
}
