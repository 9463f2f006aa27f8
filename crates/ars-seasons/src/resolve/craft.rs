use ars_core::{Activity, VisStock};
use ars_mechanics::{aura_warping, lab_total};

use super::{ProjectState, Resolution, ResolverInput, SeasonDelta, project_for, settle};
use crate::error::{SeasonError, SeasonResult};

/// Lab total minus design level: the points a season of inventing or
/// enchanting earns. Zero or less means the design is out of reach.
pub(crate) fn craft_points(input: &ResolverInput<'_>) -> i32 {
    let aura = input.aura();
    let weather = input.conditions().laboratory;
    match input.activity() {
        Activity::Invent { spell, .. } => {
            lab_total(input.character, spell.technique, spell.form, aura, input.laboratory) + weather
                - i32::try_from(spell.level).unwrap_or(i32::MAX)
        }
        Activity::Enchant { item, .. } => {
            lab_total(input.character, item.technique, item.form, aura, input.laboratory)
                + input.laboratory.map_or(0, |l| l.enchantment_bonus())
                + weather
                - i32::try_from(item.level).unwrap_or(i32::MAX)
        }
        _ => 0,
    }
}

/// Split a vis cost between the laboratory store and the covenant stock.
///
/// Returns `None` if the two together cannot cover it.
pub(crate) fn split_vis_cost(input: &ResolverInput<'_>, cost: &VisStock) -> Option<(VisStock, VisStock)> {
    let mut remaining = cost.clone();
    let from_lab = input
        .laboratory
        .map_or_else(VisStock::new, |lab| lab.vis_store.take_available(&mut remaining));
    let covenant_stock = input.covenant.map(|c| &c.vis_stock);
    if remaining.is_empty() {
        return Some((from_lab, VisStock::new()));
    }
    match covenant_stock {
        Some(stock) if stock.can_cover(&remaining) => Some((from_lab, remaining)),
        _ => None,
    }
}

pub(super) fn resolve(input: &ResolverInput<'_>) -> SeasonResult<Resolution> {
    let (name, level) = match input.activity() {
        Activity::Invent { spell, .. } => (&spell.name, spell.level),
        Activity::Enchant { item, .. } => (&item.name, item.level),
        _ => return Err(input.unmet("not a laboratory design")),
    };
    if input.laboratory.is_none() {
        return Err(input.unmet("no laboratory"));
    }
    let points = craft_points(input);
    if points <= 0 {
        return Err(input.unmet(format!("lab total does not exceed level {level}")));
    }

    let mut project = project_for(input, level);
    let mut delta = SeasonDelta {
        warping_points: aura_warping(input.aura()),
        ..SeasonDelta::default()
    };

    if !project.vis_paid {
        let cost = input.activity().vis_cost();
        let (lab_share, covenant_share) =
            split_vis_cost(input, &cost).ok_or_else(|| insufficient(input, &cost))?;
        delta.lab_vis = lab_share;
        delta.covenant_vis = covenant_share;
        project.vis_paid = true;
    }

    let gained = u32::try_from(points).unwrap_or(0);
    let (state, project) = settle(project, gained);
    let mut summary = format!(
        "worked on {name}: +{gained} points ({}/{})",
        project.accumulated_progress, project.target_progress
    );
    if !delta.lab_vis.is_empty() || !delta.covenant_vis.is_empty() {
        let mut spent = delta.lab_vis.clone();
        spent.merge(&delta.covenant_vis);
        summary.push_str(&format!(", spent {spent} vis"));
    }
    if state == ProjectState::Completed {
        match input.activity() {
            Activity::Invent { .. } => delta.spells.push(name.clone()),
            _ => delta.items.push(name.clone()),
        }
        summary.push_str(", complete");
    }
    delta.project = state;
    Ok(Resolution::new(delta, summary))
}

fn insufficient(input: &ResolverInput<'_>, cost: &VisStock) -> SeasonError {
    let mut available = VisStock::new();
    for (art, _) in cost.iter() {
        let held = input.laboratory.map_or(0, |l| l.vis_store.get(art))
            + input.covenant.map_or(0, |c| c.vis_stock.get(art));
        available.add(art, held);
    }
    SeasonError::InsufficientResources {
        character: input.character.name.clone(),
        activity: input.activity().label(),
        needed: cost.clone(),
        available,
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::{covenant, entry, input, magus};
    use super::*;
    use crate::config::SeasonConfig;
    use crate::weather::{Weather, WeatherKind};
    use ars_core::{Art, ItemDesign, ItemKind, Laboratory, SpellDesign};

    fn enchant(level: u32) -> Activity {
        Activity::Enchant {
            item: ItemDesign {
                name: "Lamp of Undying Flame".into(),
                kind: ItemKind::Invested,
                technique: Art::Creo,
                form: Art::Ignem,
                level,
            },
            seasons: 1,
        }
    }

    #[test]
    fn enchant_pays_from_lab_then_covenant() {
        let config = SeasonConfig::default();
        let magus = magus();
        let mut covenant = covenant();
        covenant.vis_stock.add(Art::Ignem, 5);
        covenant.vis_stock.add(Art::Creo, 3);
        let mut lab = Laboratory::new("Aurelius");
        lab.vis_store.add(Art::Creo, 2);
        // Level 10 invested: 4 Creo, 2 Ignem.
        let entry = entry(enchant(10));
        let mut inp = input(&magus, &entry, Some(&covenant), &config);
        inp.laboratory = Some(&lab);

        let res = resolve(&inp).unwrap();
        assert_eq!(res.delta.lab_vis, VisStock::from_pairs([(Art::Creo, 2)]));
        assert_eq!(
            res.delta.covenant_vis,
            VisStock::from_pairs([(Art::Creo, 2), (Art::Ignem, 2)])
        );
        assert_eq!(res.delta.project, ProjectState::Completed);
        assert_eq!(res.delta.items, vec!["Lamp of Undying Flame".to_string()]);
    }

    #[test]
    fn cost_above_stock_fails_without_deduction() {
        let config = SeasonConfig::default();
        let magus = magus();
        let covenant = covenant();
        let lab = Laboratory::new("Aurelius");
        let entry = entry(enchant(10));
        let mut inp = input(&magus, &entry, Some(&covenant), &config);
        inp.laboratory = Some(&lab);

        let err = resolve(&inp).unwrap_err();
        let SeasonError::InsufficientResources {
            needed, available, ..
        } = err
        else {
            panic!("expected insufficient resources");
        };
        assert_eq!(needed, VisStock::from_pairs([(Art::Creo, 4), (Art::Ignem, 2)]));
        assert_eq!(available, VisStock::from_pairs([(Art::Creo, 2)]));
    }

    #[test]
    fn design_above_lab_total_is_out_of_reach() {
        let config = SeasonConfig::default();
        let magus = magus();
        let covenant = covenant();
        let lab = Laboratory::new("Aurelius");
        let entry = entry(Activity::Invent {
            spell: SpellDesign {
                name: "The Wound that Weeps".into(),
                technique: Art::Perdo,
                form: Art::Corpus,
                level: 30,
                ritual: false,
            },
            seasons: 2,
        });
        let mut inp = input(&magus, &entry, Some(&covenant), &config);
        inp.laboratory = Some(&lab);
        assert!(matches!(
            resolve(&inp),
            Err(SeasonError::PrerequisiteNotMet { .. })
        ));
    }

    #[test]
    fn invent_accumulates_over_seasons() {
        let config = SeasonConfig::default();
        let magus = magus();
        let covenant = covenant();
        let lab = Laboratory::new("Aurelius");
        // Creo 10 + Ignem 8 + Int 2 + MT 4 + aura 3 = 27; level 15 leaves 12 a season.
        let entry = entry(Activity::Invent {
            spell: SpellDesign {
                name: "Ball of Abysmal Flame".into(),
                technique: Art::Creo,
                form: Art::Ignem,
                level: 15,
                ritual: false,
            },
            seasons: 2,
        });
        let mut inp = input(&magus, &entry, Some(&covenant), &config);
        inp.laboratory = Some(&lab);
        let res = resolve(&inp).unwrap();
        let ProjectState::Continuing(project) = res.delta.project else {
            panic!("expected a continuing project");
        };
        assert_eq!(project.accumulated_progress, 12);
        assert!(project.vis_paid);
    }

    #[test]
    fn extraordinary_weather_adds_to_lab_total() {
        let config = SeasonConfig::default();
        let magus = magus();
        let covenant = covenant();
        let lab = Laboratory::new("Aurelius");
        let entry = entry(Activity::Invent {
            spell: SpellDesign {
                name: "Ball of Abysmal Flame".into(),
                technique: Art::Creo,
                form: Art::Ignem,
                level: 15,
                ritual: false,
            },
            seasons: 2,
        });
        let weather = Weather {
            slot: entry.slot,
            kind: WeatherKind::Extraordinary,
        };
        let mut inp = input(&magus, &entry, Some(&covenant), &config);
        inp.laboratory = Some(&lab);
        assert_eq!(craft_points(&inp), 12);
        inp.weather = Some(&weather);
        assert_eq!(craft_points(&inp), 14);
    }
}
