use std::collections::BTreeMap;

use ars_core::{Activity, Subject};

use super::{ProjectState, Resolution, ResolverInput, SeasonDelta, project_for, settle};
use crate::error::SeasonResult;

const XP_PREFIX: &str = "xp.";
const FLAG_PREFIX: &str = "flag.";

/// Check that custom activity content is well formed.
///
/// Only the shape is checked: names present, `xp.*` results numeric.
pub fn validate_custom(
    name: &str,
    seasons: u32,
    requirements: &BTreeMap<String, String>,
    results: &BTreeMap<String, String>,
) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("custom activity needs a name".into());
    }
    if seasons == 0 {
        return Err("custom activity must last at least one season".into());
    }
    if let Some(key) = requirements
        .keys()
        .chain(results.keys())
        .find(|k| k.trim().is_empty())
    {
        return Err(format!("empty key {key:?} in custom activity"));
    }
    for (key, value) in results {
        if let Some(subject) = key.strip_prefix(XP_PREFIX) {
            if subject.trim().is_empty() {
                return Err(format!("result {key:?} names no subject"));
            }
            if value.trim().parse::<u32>().is_err() {
                return Err(format!("result {key:?} must be a whole number, got {value:?}"));
            }
        } else if let Some(flag) = key.strip_prefix(FLAG_PREFIX) {
            if flag.trim().is_empty() {
                return Err(format!("result {key:?} names no flag"));
            }
        }
    }
    Ok(())
}

pub(super) fn service(input: &ResolverInput<'_>) -> SeasonResult<Resolution> {
    let Activity::Service {
        ability,
        description,
    } = input.activity()
    else {
        return Err(input.unmet("not a service activity"));
    };
    let gain = input.config.exposure_xp;
    let delta = SeasonDelta {
        xp: vec![(Subject::Ability(ability.clone()), gain)],
        covenant_service: 1,
        ..SeasonDelta::default()
    };
    let what = if description.is_empty() {
        "served the covenant".to_string()
    } else {
        format!("served the covenant: {description}")
    };
    Ok(Resolution::new(delta, format!("{what} ({gain} xp in {ability})")))
}

pub(super) fn story(input: &ResolverInput<'_>) -> SeasonResult<Resolution> {
    let Activity::Story {
        description,
        experience,
        subject,
        flags,
    } = input.activity()
    else {
        return Err(input.unmet("not a story activity"));
    };
    let capped = (*experience).min(input.config.max_story_xp);
    let gain = capped.saturating_add_signed(input.conditions().outdoor);
    let mut delta = SeasonDelta {
        flags: flags.clone(),
        ..SeasonDelta::default()
    };
    let mut summary = format!("adventure: {description}");
    if let Some(subject) = subject.as_ref().filter(|_| gain > 0) {
        delta.xp.push((subject.clone(), gain));
        summary.push_str(&format!(" ({gain} xp in {subject})"));
    }
    Ok(Resolution::new(delta, summary))
}

pub(super) fn custom(input: &ResolverInput<'_>) -> SeasonResult<Resolution> {
    let Activity::Custom {
        name,
        seasons,
        requirements,
        results,
    } = input.activity()
    else {
        return Err(input.unmet("not a custom activity"));
    };
    validate_custom(name, *seasons, requirements, results).map_err(|reason| input.unmet(reason))?;

    let mut delta = SeasonDelta::default();
    if input.activity().is_project() {
        let (state, project) = settle(project_for(input, *seasons), 1);
        let finished = state == ProjectState::Completed;
        delta.project = state;
        if !finished {
            return Ok(Resolution::new(
                delta,
                format!(
                    "worked on {name} ({}/{} seasons)",
                    project.accumulated_progress, project.target_progress
                ),
            ));
        }
    }

    let mut outcomes = Vec::new();
    for (key, value) in results {
        if let Some(subject) = key.strip_prefix(XP_PREFIX) {
            let gain = value.trim().parse::<u32>().unwrap_or(0);
            delta.xp.push((Subject::parse(subject), gain));
            outcomes.push(format!("{gain} xp in {}", subject.trim()));
        } else if let Some(flag) = key.strip_prefix(FLAG_PREFIX) {
            delta.flags.push(flag.trim().to_string());
            outcomes.push(format!("flag {}", flag.trim()));
        } else {
            outcomes.push(format!("{key}: {value}"));
        }
    }
    let summary = if outcomes.is_empty() {
        format!("completed {name}")
    } else {
        format!("completed {name}: {}", outcomes.join(", "))
    };
    Ok(Resolution::new(delta, summary))
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::{entry, input, magus};
    use super::*;
    use crate::config::SeasonConfig;
    use crate::weather::{Weather, WeatherKind};
    use ars_core::Art;

    fn custom_activity(seasons: u32, results: &[(&str, &str)]) -> Activity {
        Activity::Custom {
            name: "Map the regio".into(),
            seasons,
            requirements: BTreeMap::from([("guide".to_string(), "local hunter".to_string())]),
            results: results
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    #[test]
    fn validation_is_structural_only() {
        let ok = BTreeMap::from([
            ("xp.Area Lore".to_string(), "5".to_string()),
            ("anything".to_string(), "goes".to_string()),
        ]);
        assert!(validate_custom("Map", 1, &BTreeMap::new(), &ok).is_ok());
        assert!(validate_custom("", 1, &BTreeMap::new(), &ok).is_err());
        assert!(validate_custom("Map", 0, &BTreeMap::new(), &ok).is_err());

        let bad = BTreeMap::from([("xp.Area Lore".to_string(), "lots".to_string())]);
        assert!(validate_custom("Map", 1, &BTreeMap::new(), &bad).is_err());
        let blank = BTreeMap::from([(" ".to_string(), "x".to_string())]);
        assert!(validate_custom("Map", 1, &blank, &BTreeMap::new()).is_err());
    }

    #[test]
    fn custom_applies_xp_and_flags() {
        let config = SeasonConfig::default();
        let magus = magus();
        let entry = entry(custom_activity(
            1,
            &[("xp.Vim", "3"), ("flag.regio mapped", "yes"), ("note", "mossy")],
        ));
        let res = custom(&input(&magus, &entry, None, &config)).unwrap();
        assert_eq!(res.delta.xp, vec![(Subject::Art(Art::Vim), 3)]);
        assert_eq!(res.delta.flags, vec!["regio mapped".to_string()]);
        assert!(res.summary.contains("note: mossy"));
    }

    #[test]
    fn multi_season_custom_waits_for_completion() {
        let config = SeasonConfig::default();
        let magus = magus();
        let entry = entry(custom_activity(2, &[("xp.Vim", "3")]));
        let res = custom(&input(&magus, &entry, None, &config)).unwrap();
        assert!(res.delta.xp.is_empty());
        assert!(matches!(res.delta.project, ProjectState::Continuing(_)));
    }

    #[test]
    fn story_caps_experience() {
        let config = SeasonConfig::default();
        let magus = magus();
        let entry = entry(Activity::Story {
            description: "Hunt for the white hart".into(),
            experience: 40,
            subject: Some(Subject::Ability("Hunt".into())),
            flags: vec!["met the faerie queen".into()],
        });
        let res = story(&input(&magus, &entry, None, &config)).unwrap();
        assert_eq!(res.delta.xp, vec![(Subject::Ability("Hunt".into()), 10)]);
        assert_eq!(res.delta.flags.len(), 1);
    }

    #[test]
    fn bad_weather_cuts_story_experience() {
        let config = SeasonConfig::default();
        let magus = magus();
        let entry = entry(Activity::Story {
            description: "Crossing the Alps".into(),
            experience: 5,
            subject: Some(Subject::Ability("Survival".into())),
            flags: Vec::new(),
        });
        let harsh = Weather {
            slot: entry.slot,
            kind: WeatherKind::Harsh,
        };
        let mut inp = input(&magus, &entry, None, &config);
        inp.weather = Some(&harsh);
        let res = story(&inp).unwrap();
        assert_eq!(res.delta.xp, vec![(Subject::Ability("Survival".into()), 3)]);

        let severe = Weather {
            kind: WeatherKind::Extraordinary,
            ..harsh
        };
        inp.weather = Some(&severe);
        assert!(story(&inp).unwrap().delta.xp.is_empty());
    }

    #[test]
    fn service_gives_exposure_and_service() {
        let config = SeasonConfig::default();
        let magus = magus();
        let entry = entry(Activity::Service {
            ability: "Leadership".into(),
            description: "Organised the grogs".into(),
        });
        let res = service(&input(&magus, &entry, None, &config)).unwrap();
        assert_eq!(res.delta.covenant_service, 1);
        assert_eq!(res.delta.xp, vec![(Subject::Ability("Leadership".into()), 2)]);
    }
}
