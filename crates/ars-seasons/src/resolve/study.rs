use ars_core::{Activity, Art, StudyMaterial, Subject, VisStock};
use ars_mechanics::{RollSource, stress_die};

use super::{Resolution, ResolverInput, SeasonDelta};
use crate::error::{SeasonError, SeasonResult};

/// Warping points per botch when studying from vis.
const VIS_BOTCH_WARPING: u32 = 2;

pub(super) fn resolve(input: &ResolverInput<'_>, roller: &mut dyn RollSource) -> SeasonResult<Resolution> {
    let Activity::Study { subject, material } = input.activity() else {
        return Err(input.unmet("not a study activity"));
    };
    match material {
        StudyMaterial::Book { title } => from_book(input, title),
        StudyMaterial::Vis => match subject {
            Subject::Art(art) => from_vis(input, *art, roller),
            Subject::Ability(_) => Err(input.unmet("vis can only teach a Hermetic Art")),
        },
        StudyMaterial::Practice => {
            let gain = input.config.practice_xp;
            let delta = SeasonDelta {
                xp: vec![(subject.clone(), gain)],
                ..SeasonDelta::default()
            };
            Ok(Resolution::new(
                delta,
                format!("practiced {subject} for {gain} xp"),
            ))
        }
    }
}

fn from_book(input: &ResolverInput<'_>, title: &str) -> SeasonResult<Resolution> {
    let reader = input.character;
    let exhausted = || SeasonError::SourceExhausted {
        character: reader.name.clone(),
        title: title.to_string(),
    };
    let covenant = input
        .covenant
        .ok_or_else(|| input.unmet("no covenant library to study from"))?;
    let source = covenant.source(title).ok_or_else(exhausted)?;
    if source.exhausted {
        return Err(exhausted());
    }
    let is_tractatus = source.level.is_none();
    if is_tractatus && reader.sources_read.contains(title) {
        return Err(exhausted());
    }

    let subject = &source.subject;
    let raw = source.quality.saturating_mul(input.config.study_multiplier);
    let gain = match source.level {
        Some(level) => {
            let ceiling = subject.xp_for_score(level);
            raw.min(ceiling.saturating_sub(reader.xp(subject)))
        }
        None => raw,
    };

    let mut delta = SeasonDelta {
        xp: vec![(subject.clone(), gain)],
        ..SeasonDelta::default()
    };
    if is_tractatus {
        delta.sources_read.push(title.to_string());
    }
    let mut summary = format!("read \"{title}\" and gained {gain} xp in {subject}");
    if source.single_use {
        delta.exhausted_source = Some(title.to_string());
        summary.push_str("; the source is exhausted");
    }
    Ok(Resolution::new(delta, summary))
}

fn from_vis(input: &ResolverInput<'_>, art: Art, roller: &mut dyn RollSource) -> SeasonResult<Resolution> {
    let covenant = input
        .covenant
        .ok_or_else(|| input.unmet("no covenant vis stock to study from"))?;
    let pawns = input.character.art_score(art).div_ceil(5).max(1);
    let cost = VisStock::from_pairs([(art, pawns)]);
    if !covenant.vis_stock.can_cover(&cost) {
        return Err(SeasonError::InsufficientResources {
            character: input.character.name.clone(),
            activity: input.activity().label(),
            needed: cost,
            available: VisStock::from_pairs([(art, covenant.vis_stock.get(art))]),
        });
    }

    let die = stress_die(roller, pawns);
    let mut delta = SeasonDelta {
        covenant_vis: cost,
        ..SeasonDelta::default()
    };
    let summary = if die.is_botch() {
        delta.warping_points = die.botches * VIS_BOTCH_WARPING;
        format!(
            "botched vis study of {art} ({} botches): {} warping points, no experience",
            die.botches, delta.warping_points
        )
    } else {
        let total = i64::from(die.value) + i64::from(input.aura());
        let gain = u32::try_from(total.max(0)).unwrap_or(u32::MAX);
        delta.xp.push((Subject::Art(art), gain));
        format!("studied {pawns} pawns of {art} vis and gained {gain} xp")
    };
    Ok(Resolution::new(delta, summary))
}
