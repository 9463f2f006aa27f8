use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::art::{Art, Subject};
use crate::timeline::TimelinePosition;
use crate::vis::VisStock;

fn one_season() -> u32 {
    1
}

/// What a character studies from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StudyMaterial {
    /// A book from the covenant library, looked up by title.
    Book {
        /// Title of the library source.
        title: String,
    },
    /// Raw vis of the studied Art, drawn from the covenant stock. The pawns
    /// spent follow from the current score: one per five points, at least one.
    Vis,
    /// Practice without a source.
    Practice,
}

/// What a completed research project yields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResearchTarget {
    /// A new spell added to the researcher's grimoire.
    #[default]
    Spell,
    /// An item design added to the researcher's items.
    Item,
    /// An insight recorded as a narrative flag.
    Discovery,
}

/// A spell to invent in the laboratory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpellDesign {
    /// Spell name.
    pub name: String,
    /// Technique used.
    pub technique: Art,
    /// Form used.
    pub form: Art,
    /// Spell level; also the number of points needed.
    pub level: u32,
    /// Ritual spells consume vis of the technique or form.
    #[serde(default)]
    pub ritual: bool,
}

impl SpellDesign {
    /// Vis consumed when inventing the spell: rituals cost one pawn per five
    /// levels, other spells are free.
    pub fn vis_cost(&self) -> VisStock {
        if !self.ritual {
            return VisStock::new();
        }
        VisStock::from_pairs([(self.form, (self.level / 5).max(1))])
    }
}

/// How an enchanted item holds its effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    /// A few uses, then spent.
    Charged,
    /// A single effect opened with vis.
    Invested,
    /// A powerful item opened to several effects.
    Greater,
    /// The magus's personal focus.
    Talisman,
}

/// An item to enchant in the laboratory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDesign {
    /// Item name.
    pub name: String,
    /// Kind of enchantment.
    pub kind: ItemKind,
    /// Technique of the effect.
    pub technique: Art,
    /// Form of the effect.
    pub form: Art,
    /// Effect level; also the number of points needed.
    pub level: u32,
}

impl ItemDesign {
    /// Vis consumed by the enchantment, split between technique and form.
    pub fn vis_cost(&self) -> VisStock {
        let base = (self.level / 5).max(1);
        let (technique, form) = match self.kind {
            ItemKind::Charged => (base, base / 2),
            ItemKind::Invested => (base * 2, base),
            ItemKind::Greater => (base * 3, base * 2),
            ItemKind::Talisman => (base * 2, base * 2),
        };
        VisStock::from_pairs([(self.technique, technique), (self.form, form)])
    }
}

/// The kind of an [`Activity`], without its parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    /// Reading, vis study, or practice.
    Study,
    /// Laboratory research toward a target level.
    Research,
    /// Teaching a student.
    Teach,
    /// Being taught.
    Learn,
    /// Assisting another magus in the laboratory.
    Assist,
    /// Inventing a spell.
    Invent,
    /// Enchanting an item.
    Enchant,
    /// Service to the covenant.
    Service,
    /// Adventure and story events.
    Story,
    /// User-defined activity.
    Custom,
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Study => "study",
            Self::Research => "research",
            Self::Teach => "teach",
            Self::Learn => "learn",
            Self::Assist => "assist",
            Self::Invent => "invent",
            Self::Enchant => "enchant",
            Self::Service => "service",
            Self::Story => "story",
            Self::Custom => "custom",
        };
        f.write_str(name)
    }
}

/// A unit of character effort spanning one or more seasons.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Activity {
    /// Gain experience in a subject.
    Study {
        /// What is studied.
        subject: Subject,
        /// What it is studied from.
        material: StudyMaterial,
    },
    /// Accumulate research points toward a target level.
    Research {
        /// Name of what is being researched.
        topic: String,
        /// What completion yields.
        #[serde(default)]
        target: ResearchTarget,
        /// Technique used for the lab total.
        technique: Art,
        /// Form used for the lab total.
        form: Art,
        /// Target level.
        level: u32,
        /// Seasons reserved for the work.
        #[serde(default = "one_season")]
        seasons: u32,
        /// Experimental research rolls on the extraordinary results table.
        #[serde(default)]
        experimental: bool,
        /// Another magus assisting in the laboratory.
        #[serde(default)]
        assistant: Option<String>,
    },
    /// Teach a student who spends the same season learning.
    Teach {
        /// Name of the student.
        student: String,
        /// What is taught.
        subject: Subject,
    },
    /// Learn from a teacher who spends the same season teaching.
    Learn {
        /// Name of the teacher.
        teacher: String,
        /// What is learned.
        subject: Subject,
    },
    /// Help another magus with laboratory research.
    Assist {
        /// Name of the magus leading the research.
        lead: String,
    },
    /// Invent a spell.
    Invent {
        /// The spell design.
        spell: SpellDesign,
        /// Seasons reserved for the work.
        #[serde(default = "one_season")]
        seasons: u32,
    },
    /// Enchant an item.
    Enchant {
        /// The item design.
        item: ItemDesign,
        /// Seasons reserved for the work.
        #[serde(default = "one_season")]
        seasons: u32,
    },
    /// Work for the covenant.
    Service {
        /// Ability exercised while serving.
        ability: String,
        /// What the service was.
        #[serde(default)]
        description: String,
    },
    /// Go on an adventure.
    Story {
        /// What happened.
        description: String,
        /// Experience awarded.
        #[serde(default)]
        experience: u32,
        /// Subject the experience goes to, if any.
        #[serde(default)]
        subject: Option<Subject>,
        /// Narrative flags set on the character.
        #[serde(default)]
        flags: Vec<String>,
    },
    /// User-defined activity with free-form requirements and results.
    Custom {
        /// Activity name.
        name: String,
        /// Seasons the activity spans.
        #[serde(default = "one_season")]
        seasons: u32,
        /// Requirements, validated only for structure.
        #[serde(default)]
        requirements: BTreeMap<String, String>,
        /// Results applied on completion.
        #[serde(default)]
        results: BTreeMap<String, String>,
    },
}

/// How a character takes part in a coupled activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// The teacher or lead researcher; resolves the pair.
    Initiator,
    /// The student or assistant.
    Passive,
}

impl Activity {
    /// The kind of this activity.
    pub fn kind(&self) -> ActivityKind {
        match self {
            Self::Study { .. } => ActivityKind::Study,
            Self::Research { .. } => ActivityKind::Research,
            Self::Teach { .. } => ActivityKind::Teach,
            Self::Learn { .. } => ActivityKind::Learn,
            Self::Assist { .. } => ActivityKind::Assist,
            Self::Invent { .. } => ActivityKind::Invent,
            Self::Enchant { .. } => ActivityKind::Enchant,
            Self::Service { .. } => ActivityKind::Service,
            Self::Story { .. } => ActivityKind::Story,
            Self::Custom { .. } => ActivityKind::Custom,
        }
    }

    /// Seasons this activity occupies when scheduled (at least one).
    pub fn seasons(&self) -> u32 {
        match self {
            Self::Research { seasons, .. }
            | Self::Invent { seasons, .. }
            | Self::Enchant { seasons, .. }
            | Self::Custom { seasons, .. } => (*seasons).max(1),
            _ => 1,
        }
    }

    /// Returns true if progress on this activity can carry across seasons.
    pub fn is_project(&self) -> bool {
        match self {
            Self::Research { .. } | Self::Invent { .. } | Self::Enchant { .. } => true,
            Self::Custom { seasons, .. } => *seasons > 1,
            _ => false,
        }
    }

    /// Identifies the project this activity works on, so a later activity
    /// with the same key is recognised as a continuation.
    pub fn project_key(&self) -> Option<String> {
        if !self.is_project() {
            return None;
        }
        let name = match self {
            Self::Research { topic, .. } => topic,
            Self::Invent { spell, .. } => &spell.name,
            Self::Enchant { item, .. } => &item.name,
            Self::Custom { name, .. } => name,
            _ => return None,
        };
        Some(format!("{}:{}", self.kind(), name))
    }

    /// The partner character and this side's role, for coupled activities.
    pub fn partner(&self) -> Option<(&str, Role)> {
        match self {
            Self::Teach { student, .. } => Some((student, Role::Initiator)),
            Self::Research {
                assistant: Some(assistant),
                ..
            } => Some((assistant, Role::Initiator)),
            Self::Learn { teacher, .. } => Some((teacher, Role::Passive)),
            Self::Assist { lead } => Some((lead, Role::Passive)),
            _ => None,
        }
    }

    /// The entry the partner must hold in the same slot when `initiator`
    /// queues this activity.
    pub fn counterpart(&self, initiator: &str) -> Option<Activity> {
        match self {
            Self::Teach { subject, .. } => Some(Self::Learn {
                teacher: initiator.to_string(),
                subject: subject.clone(),
            }),
            Self::Research {
                assistant: Some(_), ..
            } => Some(Self::Assist {
                lead: initiator.to_string(),
            }),
            _ => None,
        }
    }

    /// Vis consumed up front when the work starts.
    pub fn vis_cost(&self) -> VisStock {
        match self {
            Self::Invent { spell, .. } => spell.vis_cost(),
            Self::Enchant { item, .. } => item.vis_cost(),
            _ => VisStock::new(),
        }
    }

    /// A short human-readable label.
    pub fn label(&self) -> String {
        match self {
            Self::Study { subject, material } => match material {
                StudyMaterial::Book { title } => format!("Study {subject} from \"{title}\""),
                StudyMaterial::Vis => format!("Study {subject} from vis"),
                StudyMaterial::Practice => format!("Practice {subject}"),
            },
            Self::Research {
                topic, experimental, ..
            } => {
                if *experimental {
                    format!("Research {topic} (experimental)")
                } else {
                    format!("Research {topic}")
                }
            }
            Self::Teach { student, subject } => format!("Teach {subject} to {student}"),
            Self::Learn { teacher, subject } => format!("Learn {subject} from {teacher}"),
            Self::Assist { lead } => format!("Assist {lead} in the laboratory"),
            Self::Invent { spell, .. } => format!("Invent {}", spell.name),
            Self::Enchant { item, .. } => format!("Enchant {}", item.name),
            Self::Service { ability, .. } => format!("Covenant service ({ability})"),
            Self::Story { description, .. } => format!("Story: {description}"),
            Self::Custom { name, .. } => name.clone(),
        }
    }
}

impl fmt::Display for Activity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// One season's entry in a character's activity queue.
///
/// Multi-season activities are expanded into one entry per season sharing a
/// `series` id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueuedActivity {
    /// Shared by every entry of one scheduled activity.
    pub series: Uuid,
    /// The activity being worked on.
    pub activity: Activity,
    /// The season this entry occupies.
    pub slot: TimelinePosition,
    /// One-based index of this entry within the series.
    pub part: u32,
    /// Number of entries in the series.
    pub of: u32,
}

impl QueuedActivity {
    /// Expand an activity into consecutive per-season entries from `start`.
    pub fn series(activity: Activity, start: TimelinePosition) -> Vec<QueuedActivity> {
        let series = Uuid::new_v4();
        let of = activity.seasons();
        (0..of)
            .map(|i| QueuedActivity {
                series,
                activity: activity.clone(),
                slot: start.advance_by(i),
                part: i + 1,
                of,
            })
            .collect()
    }

    /// Returns true for the last entry of its series.
    pub fn is_last(&self) -> bool {
        self.part >= self.of
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::Season;

    fn research(seasons: u32) -> Activity {
        Activity::Research {
            topic: "Ward against Faeries".into(),
            target: ResearchTarget::Spell,
            technique: Art::Rego,
            form: Art::Vim,
            level: 20,
            seasons,
            experimental: false,
            assistant: None,
        }
    }

    #[test]
    fn series_expands_per_season() {
        let start = TimelinePosition::new(1220, Season::Autumn);
        let entries = QueuedActivity::series(research(3), start);
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[2].slot, TimelinePosition::new(1221, Season::Spring));
        assert!(entries.iter().all(|e| e.series == entries[0].series));
        assert!(entries[2].is_last());
        assert!(!entries[0].is_last());
    }

    #[test]
    fn project_key_identifies_continuations() {
        assert_eq!(
            research(2).project_key().as_deref(),
            Some("research:Ward against Faeries")
        );
        let study = Activity::Study {
            subject: Subject::Art(Art::Creo),
            material: StudyMaterial::Practice,
        };
        assert!(study.project_key().is_none());
        let custom = Activity::Custom {
            name: "Build a tower".into(),
            seasons: 1,
            requirements: BTreeMap::new(),
            results: BTreeMap::new(),
        };
        assert!(!custom.is_project());
    }

    #[test]
    fn teach_counterpart_is_learn() {
        let teach = Activity::Teach {
            student: "Fenicia".into(),
            subject: Subject::Art(Art::Ignem),
        };
        assert_eq!(teach.partner(), Some(("Fenicia", Role::Initiator)));
        assert_eq!(
            teach.counterpart("Aurelius"),
            Some(Activity::Learn {
                teacher: "Aurelius".into(),
                subject: Subject::Art(Art::Ignem),
            })
        );
    }

    #[test]
    fn item_vis_cost_by_kind() {
        let mut item = ItemDesign {
            name: "Wand of Flame".into(),
            kind: ItemKind::Charged,
            technique: Art::Creo,
            form: Art::Ignem,
            level: 15,
        };
        assert_eq!(
            item.vis_cost(),
            VisStock::from_pairs([(Art::Creo, 3), (Art::Ignem, 1)])
        );
        item.kind = ItemKind::Greater;
        assert_eq!(
            item.vis_cost(),
            VisStock::from_pairs([(Art::Creo, 9), (Art::Ignem, 6)])
        );
    }

    #[test]
    fn ritual_spells_cost_vis() {
        let mut spell = SpellDesign {
            name: "Aegis of the Hearth".into(),
            technique: Art::Rego,
            form: Art::Vim,
            level: 20,
            ritual: false,
        };
        assert!(spell.vis_cost().is_empty());
        spell.ritual = true;
        assert_eq!(spell.vis_cost(), VisStock::from_pairs([(Art::Vim, 4)]));
    }

    #[test]
    fn activity_json_shape() {
        let json = r#"{"type":"study","subject":{"art":"Creo"},"material":{"kind":"book","title":"Summa"}}"#;
        let activity: Activity = serde_json::from_str(json).unwrap();
        assert_eq!(activity.kind(), ActivityKind::Study);
        assert_eq!(activity.seasons(), 1);

        let json = r#"{"type":"research","topic":"X","technique":"Creo","form":"Vim","level":10,"seasons":2}"#;
        let activity: Activity = serde_json::from_str(json).unwrap();
        assert_eq!(activity.seasons(), 2);
        assert!(activity.is_project());
    }

    #[test]
    fn vis_material_carries_no_pawn_count() {
        let material: StudyMaterial = serde_json::from_str(r#"{"kind":"vis"}"#).unwrap();
        assert_eq!(material, StudyMaterial::Vis);
        assert_eq!(serde_json::to_value(&material).unwrap(), serde_json::json!({"kind": "vis"}));
    }
}
