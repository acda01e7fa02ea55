//! Extract bracketed update blocks from model responses
//!
//! Each block form is one rule: a case-insensitive pattern plus a constructor.
//! Every rule is run over the whole response and the hits are merged by byte
//! offset, so the output follows the order the blocks were written in.
//! A block that does not fit its rule exactly is not matched at all.

use regex::{Captures, Regex};
use std::sync::OnceLock;

use crate::directive::Directive;

/// Free-text field: stops at a line break or the next bracket
const FIELD: &str = r"([^\[\r\n]+?)";

type Build = fn(&Captures) -> Option<Directive>;

struct Rule {
    name: &'static str,
    pattern: Regex,
    build: Build,
}

struct RuleSource {
    name: &'static str,
    pattern: String,
    build: Build,
}

fn rule_sources() -> Vec<RuleSource> {
    vec![
        RuleSource {
            name: "ammo_expended",
            pattern: format!(
                r"(?i)\[AMMO_UPDATE\]\s*ITEM:\s*{FIELD}\s*EXPENDED:\s*(\d+)\s*\[/AMMO_UPDATE\]"
            ),
            build: ammo_expended,
        },
        RuleSource {
            name: "ammo_remaining",
            pattern: format!(
                r"(?i)\[AMMO_UPDATE\]\s*ITEM:\s*{FIELD}\s*REMAINING:\s*(\d+)\s*\[/AMMO_UPDATE\]"
            ),
            build: ammo_remaining,
        },
        RuleSource {
            name: "loadout_set",
            pattern: format!(
                r"(?i)\[LOADOUT_UPDATE\]\s*TYPE:\s*{FIELD}\s*SET:\s*(\d+)\s*\[/LOADOUT_UPDATE\]"
            ),
            build: loadout_set,
        },
        RuleSource {
            name: "loadout_add",
            pattern: format!(
                r"(?i)\[LOADOUT_UPDATE\]\s*TYPE:\s*{FIELD}\s*ADD:\s*(\d+)\s*\[/LOADOUT_UPDATE\]"
            ),
            build: loadout_add,
        },
        RuleSource {
            name: "loadout_platform",
            pattern: format!(
                r"(?i)\[LOADOUT_UPDATE\]\s*(?:PLATFORM|UNIT):\s*{FIELD}\s*COUNT:\s*(\d+)\s*\[/LOADOUT_UPDATE\]"
            ),
            build: loadout_platform,
        },
        RuleSource {
            name: "loadout_clear",
            pattern: r"(?i)\[LOADOUT_UPDATE\]\s*CLEAR:\s*ALL\s*\[/LOADOUT_UPDATE\]".to_string(),
            build: loadout_clear,
        },
        RuleSource {
            name: "map_add",
            pattern: format!(
                r#"(?i)\[MAP_UPDATE\]\s*ACTION:\s*ADD\s*NAME:\s*"([^"\r\n]+)"\s*COORD:\s*{FIELD}\s*FORCE:\s*([^\[\s]+)\s*SYSTEM:\s*{FIELD}\s*\[/MAP_UPDATE\]"#
            ),
            build: map_add,
        },
        RuleSource {
            name: "map_remove",
            pattern: r#"(?i)\[MAP_UPDATE\]\s*ACTION:\s*REMOVE\s*NAME:\s*"([^"\r\n]+)"\s*\[/MAP_UPDATE\]"#
                .to_string(),
            build: map_remove,
        },
        RuleSource {
            name: "map_clear",
            pattern: r"(?i)\[MAP_UPDATE\]\s*ACTION:\s*CLEAR(?:\s*FORCE:\s*([^\[\s]+))?\s*\[/MAP_UPDATE\]"
                .to_string(),
            build: map_clear,
        },
    ]
}

fn ammo_expended(c: &Captures) -> Option<Directive> {
    Some(Directive::AmmoExpend {
        item_text: text(c, 1)?,
        amount: number(c, 2)?,
    })
}

fn ammo_remaining(c: &Captures) -> Option<Directive> {
    Some(Directive::AmmoSetRemaining {
        item_text: text(c, 1)?,
        amount: number(c, 2)?,
    })
}

fn loadout_set(c: &Captures) -> Option<Directive> {
    Some(Directive::LoadoutSet {
        item_text: text(c, 1)?,
        amount: number(c, 2)?,
    })
}

fn loadout_add(c: &Captures) -> Option<Directive> {
    Some(Directive::LoadoutAdd {
        item_text: text(c, 1)?,
        amount: number(c, 2)?,
    })
}

fn loadout_platform(c: &Captures) -> Option<Directive> {
    Some(Directive::LoadoutPlatform {
        platform_text: text(c, 1)?,
        count: number(c, 2)?,
    })
}

fn loadout_clear(_: &Captures) -> Option<Directive> {
    Some(Directive::LoadoutClearAll)
}

fn map_add(c: &Captures) -> Option<Directive> {
    Some(Directive::MapAdd {
        name: text(c, 1)?,
        coord_text: text(c, 2)?,
        allegiance_text: text(c, 3)?,
        system: text(c, 4)?,
    })
}

fn map_remove(c: &Captures) -> Option<Directive> {
    Some(Directive::MapRemove { name: text(c, 1)? })
}

fn map_clear(c: &Captures) -> Option<Directive> {
    Some(Directive::MapClear {
        allegiance_text: text(c, 1),
    })
}

fn text(caps: &Captures, group: usize) -> Option<String> {
    let value = caps.get(group)?.as_str().trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn number(caps: &Captures, group: usize) -> Option<u32> {
    caps.get(group)?.as_str().parse().ok()
}

static RULES: OnceLock<Vec<Rule>> = OnceLock::new();

fn rules() -> &'static [Rule] {
    RULES.get_or_init(|| {
        rule_sources()
            .into_iter()
            .filter_map(|source| match Regex::new(&source.pattern) {
                Ok(pattern) => Some(Rule {
                    name: source.name,
                    pattern,
                    build: source.build,
                }),
                Err(e) => {
                    tracing::error!("directive rule {} failed to compile: {}", source.name, e);
                    None
                }
            })
            .collect()
    })
}

/// Stateless extractor for update blocks
pub struct DirectiveParser;

impl DirectiveParser {
    /// All directives in `response`, in the order they appear
    pub fn parse(response: &str) -> Vec<Directive> {
        let mut found: Vec<(usize, Directive)> = Vec::new();

        for rule in rules() {
            for caps in rule.pattern.captures_iter(response) {
                let Some(whole) = caps.get(0) else {
                    continue;
                };
                match (rule.build)(&caps) {
                    Some(directive) => found.push((whole.start(), directive)),
                    None => tracing::debug!(
                        "{} block at {} had an unusable field",
                        rule.name,
                        whole.start()
                    ),
                }
            }
        }

        found.sort_by_key(|(offset, _)| *offset);
        if !found.is_empty() {
            tracing::debug!("parsed {} directive(s) from response", found.len());
        }
        found.into_iter().map(|(_, d)| d).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_rules_compile() {
        assert_eq!(rules().len(), rule_sources().len());
    }

    #[test]
    fn test_multiline_lowercase_expend() {
        let response = "Recommend 24 rockets.\n[AMMO_UPDATE]\nitem: GMLRS\nEXPENDED: 24\n[/AMMO_UPDATE]\n";
        assert_eq!(
            DirectiveParser::parse(response),
            vec![Directive::AmmoExpend {
                item_text: "GMLRS".into(),
                amount: 24
            }]
        );
    }

    #[test]
    fn test_inline_block_forms() {
        let response = "[ammo_update] ITEM: Mortar Illum REMAINING: 30 [/ammo_update]";
        assert_eq!(
            DirectiveParser::parse(response),
            vec![Directive::AmmoSetRemaining {
                item_text: "Mortar Illum".into(),
                amount: 30
            }]
        );
    }

    #[test]
    fn test_mixed_blocks_keep_response_order() {
        let response = r#"
[MAP_UPDATE] ACTION: ADD NAME: "SAM 1" COORD: 15.5, 120.3 FORCE: red SYSTEM: HQ-9 [/MAP_UPDATE]
[LOADOUT_UPDATE] TYPE: NewMissileX SET: 40 [/LOADOUT_UPDATE]
[AMMO_UPDATE] ITEM: ATACMS EXPENDED: 2 [/AMMO_UPDATE]
[LOADOUT_UPDATE] CLEAR: ALL [/LOADOUT_UPDATE]
[MAP_UPDATE] ACTION: REMOVE NAME: "SAM 1" [/MAP_UPDATE]
"#;
        let directives = DirectiveParser::parse(response);
        assert_eq!(directives.len(), 5);
        assert_eq!(
            directives[0],
            Directive::MapAdd {
                name: "SAM 1".into(),
                coord_text: "15.5, 120.3".into(),
                allegiance_text: "red".into(),
                system: "HQ-9".into(),
            }
        );
        assert!(matches!(directives[1], Directive::LoadoutSet { amount: 40, .. }));
        assert!(matches!(directives[2], Directive::AmmoExpend { amount: 2, .. }));
        assert_eq!(directives[3], Directive::LoadoutClearAll);
        assert_eq!(
            directives[4],
            Directive::MapRemove {
                name: "SAM 1".into()
            }
        );
    }

    #[test]
    fn test_platform_and_unit_counts() {
        let response = "[LOADOUT_UPDATE] PLATFORM: HIMARS COUNT: 4 [/LOADOUT_UPDATE]\n\
                        [LOADOUT_UPDATE] UNIT: Mortar Platoon COUNT: 2 [/LOADOUT_UPDATE]";
        assert_eq!(
            DirectiveParser::parse(response),
            vec![
                Directive::LoadoutPlatform {
                    platform_text: "HIMARS".into(),
                    count: 4
                },
                Directive::LoadoutPlatform {
                    platform_text: "Mortar Platoon".into(),
                    count: 2
                },
            ]
        );
    }

    #[test]
    fn test_map_clear_with_and_without_force() {
        let response = "[MAP_UPDATE] ACTION: CLEAR FORCE: blue [/MAP_UPDATE] \
                        [MAP_UPDATE]ACTION:CLEAR[/MAP_UPDATE]";
        assert_eq!(
            DirectiveParser::parse(response),
            vec![
                Directive::MapClear {
                    allegiance_text: Some("blue".into())
                },
                Directive::MapClear {
                    allegiance_text: None
                },
            ]
        );
    }

    #[test]
    fn test_unresolvable_payload_is_still_extracted() {
        let response = "[AMMO_UPDATE] ITEM: Unobtainium Darts EXPENDED: 3 [/AMMO_UPDATE]";
        assert_eq!(
            DirectiveParser::parse(response),
            vec![Directive::AmmoExpend {
                item_text: "Unobtainium Darts".into(),
                amount: 3
            }]
        );
    }

    #[test]
    fn test_malformed_blocks_are_ignored() {
        let cases = [
            // missing amount
            "[AMMO_UPDATE] ITEM: GMLRS [/AMMO_UPDATE]",
            // wrong field order
            "[AMMO_UPDATE] EXPENDED: 4 ITEM: GMLRS [/AMMO_UPDATE]",
            // unclosed
            "[AMMO_UPDATE] ITEM: GMLRS EXPENDED: 4",
            // non-numeric amount
            "[LOADOUT_UPDATE] TYPE: GMLRS SET: lots [/LOADOUT_UPDATE]",
            // amount overflows u32
            "[LOADOUT_UPDATE] TYPE: GMLRS SET: 99999999999 [/LOADOUT_UPDATE]",
            // unquoted name
            "[MAP_UPDATE] ACTION: REMOVE NAME: SAM 1 [/MAP_UPDATE]",
        ];
        for case in cases {
            assert!(DirectiveParser::parse(case).is_empty(), "matched: {}", case);
        }
    }

    #[test]
    fn test_item_cannot_span_blocks() {
        let response = "[AMMO_UPDATE] ITEM: GMLRS REMAINING: 50 [/AMMO_UPDATE] and later \
                        [AMMO_UPDATE] ITEM: PrSM EXPENDED: 2 [/AMMO_UPDATE]";
        let directives = DirectiveParser::parse(response);
        assert_eq!(directives.len(), 2);
        assert_eq!(
            directives[1],
            Directive::AmmoExpend {
                item_text: "PrSM".into(),
                amount: 2
            }
        );
    }

    #[test]
    fn test_no_blocks() {
        assert!(DirectiveParser::parse("No updates this turn.").is_empty());
        assert!(DirectiveParser::parse("").is_empty());
    }
}
