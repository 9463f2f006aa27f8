use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::art::{Art, Subject};
use crate::timeline::Season;
use crate::vis::VisStock;

/// A book in a covenant library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudySource {
    /// Title, unique within the library.
    pub title: String,
    /// What the book teaches.
    pub subject: Subject,
    /// Experience granted per season of study.
    pub quality: u32,
    /// A summa's level: study never raises the subject past it.
    /// `None` for a tractatus.
    #[serde(default)]
    pub level: Option<u32>,
    /// Each reader gains from it once; a single-use source is spent after one read.
    #[serde(default)]
    pub single_use: bool,
    /// Set once a single-use source has been read.
    #[serde(default)]
    pub exhausted: bool,
}

impl StudySource {
    /// A summa: repeatable study up to `level`.
    pub fn summa(title: impl Into<String>, subject: Subject, level: u32, quality: u32) -> Self {
        Self {
            title: title.into(),
            subject,
            quality,
            level: Some(level),
            single_use: false,
            exhausted: false,
        }
    }

    /// A tractatus: each reader gains from it once.
    pub fn tractatus(title: impl Into<String>, subject: Subject, quality: u32) -> Self {
        Self {
            title: title.into(),
            subject,
            quality,
            level: None,
            single_use: false,
            exhausted: false,
        }
    }

    /// Mark the source as spent after one read.
    pub fn single_use(mut self) -> Self {
        self.single_use = true;
        self
    }
}

/// A place the covenant harvests vis from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisSource {
    /// Name of the source.
    pub name: String,
    /// Art of the vis it yields.
    pub art: Art,
    /// Pawns per harvest.
    pub pawns: u32,
    /// Season of the harvest; every season when `None`.
    #[serde(default)]
    pub season: Option<Season>,
}

/// A community of magi sharing an aura, a library, and a vis stock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Covenant {
    /// Unique name within the saga.
    pub name: String,
    /// Magic aura strength.
    pub aura: i32,
    /// Shared vis.
    #[serde(default)]
    pub vis_stock: VisStock,
    /// Seasonal vis harvests.
    #[serde(default)]
    pub vis_sources: Vec<VisSource>,
    /// Books available for study.
    #[serde(default)]
    pub library: Vec<StudySource>,
    /// Names of member magi.
    #[serde(default)]
    pub magi: Vec<String>,
    /// Mundane wealth in abstract points.
    #[serde(default)]
    pub resources: i32,
    /// Seasons of service members have given.
    #[serde(default)]
    pub service_seasons: u32,
    /// Narrative flags set by events.
    #[serde(default)]
    pub flags: BTreeSet<String>,
}

impl Covenant {
    /// Create a covenant with the given aura and empty stores.
    pub fn new(name: impl Into<String>, aura: i32) -> Self {
        Self {
            name: name.into(),
            aura,
            vis_stock: VisStock::new(),
            vis_sources: Vec::new(),
            library: Vec::new(),
            magi: Vec::new(),
            resources: 10,
            service_seasons: 0,
            flags: BTreeSet::new(),
        }
    }

    /// Add a book to the library.
    pub fn with_source(mut self, source: StudySource) -> Self {
        self.library.push(source);
        self
    }

    /// Add vis to the stock.
    pub fn with_vis(mut self, art: Art, pawns: u32) -> Self {
        self.vis_stock.add(art, pawns);
        self
    }

    /// Look up a library book by title.
    pub fn source(&self, title: &str) -> Option<&StudySource> {
        self.library.iter().find(|s| s.title == title)
    }

    /// Look up a library book by title, mutably.
    pub fn source_mut(&mut self, title: &str) -> Option<&mut StudySource> {
        self.library.iter_mut().find(|s| s.title == title)
    }

    /// Harvest every source due in `season` into the stock and return what
    /// was gathered.
    pub fn collect_vis(&mut self, season: Season) -> VisStock {
        let gathered = VisStock::from_pairs(
            self.vis_sources
                .iter()
                .filter(|source| source.season.is_none_or(|s| s == season))
                .map(|source| (source.art, source.pawns)),
        );
        self.vis_stock.merge(&gathered);
        gathered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn library_lookup() {
        let covenant = Covenant::new("Semita Errabunda", 3).with_source(
            StudySource::summa("On the Creation of Things", Subject::Art(Art::Creo), 12, 10),
        );
        let source = covenant.source("On the Creation of Things").unwrap();
        assert_eq!(source.level, Some(12));
        assert!(covenant.source("Missing").is_none());
    }

    #[test]
    fn collect_vis_respects_harvest_season() {
        let mut covenant = Covenant::new("Semita Errabunda", 3);
        covenant.vis_sources.push(VisSource {
            name: "Blackthorn grove".into(),
            art: Art::Herbam,
            pawns: 3,
            season: Some(Season::Autumn),
        });
        covenant.vis_sources.push(VisSource {
            name: "Standing stone".into(),
            art: Art::Vim,
            pawns: 1,
            season: None,
        });

        let spring = covenant.collect_vis(Season::Spring);
        assert_eq!(spring.total(), 1);
        let autumn = covenant.collect_vis(Season::Autumn);
        assert_eq!(autumn.get(Art::Herbam), 3);
        assert_eq!(covenant.vis_stock.get(Art::Vim), 2);
        assert_eq!(covenant.vis_stock.get(Art::Herbam), 3);
    }
}
