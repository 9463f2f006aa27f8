use ars_core::{Activity, ResearchTarget};
use ars_mechanics::lab::assistant_bonus;
use ars_mechanics::{Extraordinary, RollSource, aura_warping, experimental_result, lab_total, simple_die};

use super::{ProjectState, Resolution, ResolverInput, SeasonDelta, project_for, settle};
use crate::error::SeasonResult;

/// Warping points per botch on the extraordinary results table.
const TWILIGHT_WARPING: u32 = 2;

/// Research points a character earns per season.
pub(crate) fn points_per_season(input: &ResolverInput<'_>) -> u32 {
    let Activity::Research {
        technique, form, ..
    } = input.activity()
    else {
        return 0;
    };
    let total = lab_total(input.character, *technique, *form, input.aura(), input.laboratory)
        + input.partner.map_or(0, assistant_bonus)
        + input.conditions().laboratory;
    u32::try_from(total.max(0)).unwrap_or(0) / input.config.research_divisor.max(1)
}

pub(super) fn resolve(input: &ResolverInput<'_>, roller: &mut dyn RollSource) -> SeasonResult<Resolution> {
    let Activity::Research {
        topic,
        target,
        level,
        experimental,
        ..
    } = input.activity()
    else {
        return Err(input.unmet("not a research activity"));
    };
    if input.laboratory.is_none() {
        return Err(input.unmet("no laboratory"));
    }

    let mut project = project_for(input, *level);
    let mut points = points_per_season(input);
    let mut delta = SeasonDelta {
        warping_points: aura_warping(input.aura()),
        ..SeasonDelta::default()
    };
    let mut notes = Vec::new();

    if *experimental {
        points += simple_die(roller);
        let (_, result) = experimental_result(roller, input.config.experimental_botch_dice);
        match result {
            Extraordinary::Disaster { botches } => {
                points = 0;
                delta.warping_points += botches * TWILIGHT_WARPING;
                delta.flags.push(format!("twilight: {topic}"));
                notes.push("disaster: the season's work is lost to Twilight".to_string());
            }
            Extraordinary::Setback { points: lost } => {
                project.accumulated_progress = project.accumulated_progress.saturating_sub(lost);
                points = 0;
                notes.push(format!("setback: {lost} points lost"));
            }
            Extraordinary::NoEffect => {}
            Extraordinary::Bonus { points: extra } => {
                points += extra;
                notes.push(format!("discovery: {extra} bonus points"));
            }
            Extraordinary::Breakthrough => {
                points = project
                    .target_progress
                    .saturating_sub(project.accumulated_progress)
                    .max(points);
                notes.push("breakthrough!".to_string());
            }
        }
    }

    let (state, project) = settle(project, points);
    let mut summary = format!(
        "researched {topic}: +{points} points ({}/{})",
        project.accumulated_progress, project.target_progress
    );
    if state == ProjectState::Completed {
        match target {
            ResearchTarget::Spell => delta.spells.push(topic.clone()),
            ResearchTarget::Item => delta.items.push(topic.clone()),
            ResearchTarget::Discovery => delta.flags.push(format!("discovery: {topic}")),
        }
        summary.push_str(", complete");
    }
    for note in notes {
        summary.push_str("; ");
        summary.push_str(&note);
    }
    if delta.warping_points > 0 {
        summary.push_str(&format!("; {} warping points", delta.warping_points));
    }
    delta.project = state;
    Ok(Resolution::new(delta, summary))
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::{covenant, entry, input, magus, slot};
    use super::*;
    use crate::config::SeasonConfig;
    use crate::error::SeasonError;
    use ars_core::{Art, InProgressProject, InterruptionRecord, Laboratory, QueuedActivity};
    use ars_mechanics::ScriptedRolls;
    use chrono::Utc;

    fn research(experimental: bool) -> Activity {
        Activity::Research {
            topic: "Pilum of Fire".into(),
            target: ResearchTarget::Spell,
            technique: Art::Creo,
            form: Art::Ignem,
            level: 20,
            seasons: 3,
            experimental,
            assistant: None,
        }
    }

    fn dice(faces: &[u32]) -> ScriptedRolls {
        ScriptedRolls::new(faces.iter().copied()).unwrap()
    }

    #[test]
    fn points_come_from_lab_total() {
        // Creo 10 + Ignem 8 + Int 2 + MT 4 + aura 3 = 27, over 5 is 5.
        let config = SeasonConfig::default();
        let magus = magus();
        let covenant = covenant();
        let lab = Laboratory::new("Aurelius");
        let entry = entry(research(false));
        let mut inp = input(&magus, &entry, Some(&covenant), &config);
        inp.laboratory = Some(&lab);
        assert_eq!(points_per_season(&inp), 5);

        let res = resolve(&inp, &mut dice(&[])).unwrap();
        let ProjectState::Continuing(project) = res.delta.project else {
            panic!("expected a continuing project");
        };
        assert_eq!(project.accumulated_progress, 5);
        assert_eq!(project.remaining_seasons, 2);
        assert_eq!(project.seasons_worked, 1);
    }

    #[test]
    fn research_needs_a_laboratory() {
        let config = SeasonConfig::default();
        let magus = magus();
        let entry = entry(research(false));
        let err = resolve(&input(&magus, &entry, None, &config), &mut dice(&[])).unwrap_err();
        assert!(matches!(err, SeasonError::PrerequisiteNotMet { .. }));
    }

    #[test]
    fn final_season_completes_and_grants_spell() {
        let config = SeasonConfig::default();
        let magus = magus();
        let covenant = covenant();
        let lab = Laboratory::new("Aurelius");
        let entries = QueuedActivity::series(research(false), slot());
        let mut existing = InProgressProject::new(research(false), 20, slot());
        existing.accumulated_progress = 15;
        let mut inp = input(&magus, &entries[2], Some(&covenant), &config);
        inp.laboratory = Some(&lab);
        inp.project = Some(&existing);

        let res = resolve(&inp, &mut dice(&[])).unwrap();
        assert_eq!(res.delta.project, ProjectState::Completed);
        assert_eq!(res.delta.spells, vec!["Pilum of Fire".to_string()]);
    }

    #[test]
    fn continuation_restores_saved_progress() {
        let config = SeasonConfig::default();
        let magus = magus();
        let covenant = covenant();
        let lab = Laboratory::new("Aurelius");
        let entry = entry(research(false));
        let mut existing = InProgressProject::new(research(false), 20, slot());
        existing.accumulated_progress = 9;
        existing.interruption = Some(InterruptionRecord {
            reason: "Tribunal".into(),
            duration: 1,
            elapsed_seasons: 2,
            saved_progress: 9,
            interrupted_at: slot(),
            recorded_at: Utc::now(),
        });
        let mut inp = input(&magus, &entry, Some(&covenant), &config);
        inp.laboratory = Some(&lab);
        inp.project = Some(&existing);

        let res = resolve(&inp, &mut dice(&[])).unwrap();
        let ProjectState::Continuing(project) = res.delta.project else {
            panic!("expected a continuing project");
        };
        assert_eq!(project.accumulated_progress, 14);
        assert!(project.interruption.is_none());
    }

    #[test]
    fn experimental_breakthrough_completes_early() {
        let config = SeasonConfig::default();
        let magus = magus();
        let covenant = covenant();
        let lab = Laboratory::new("Aurelius");
        let entry = entry(research(true));
        let mut inp = input(&magus, &entry, Some(&covenant), &config);
        inp.laboratory = Some(&lab);

        // simple die 3, then stress 1 -> 9 doubles to 18.
        let res = resolve(&inp, &mut dice(&[3, 1, 9])).unwrap();
        assert_eq!(res.delta.project, ProjectState::Completed);
        assert!(res.summary.contains("breakthrough"));
    }

    #[test]
    fn experimental_disaster_loses_the_season() {
        let config = SeasonConfig::default();
        let magus = magus();
        let covenant = covenant();
        let lab = Laboratory::new("Aurelius");
        let entry = entry(research(true));
        let mut inp = input(&magus, &entry, Some(&covenant), &config);
        inp.laboratory = Some(&lab);

        let res = resolve(&inp, &mut dice(&[4, 0, 0])).unwrap();
        let ProjectState::Continuing(project) = res.delta.project else {
            panic!("expected a continuing project");
        };
        assert_eq!(project.accumulated_progress, 0);
        assert_eq!(res.delta.warping_points, 2);
        assert_eq!(res.delta.flags, vec!["twilight: Pilum of Fire".to_string()]);
    }
}
