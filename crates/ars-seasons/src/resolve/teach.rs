use ars_core::art::TEACHING;
use ars_core::{Activity, Characteristic, Subject};

use super::{Resolution, ResolverInput, SeasonDelta};
use crate::error::{SeasonError, SeasonResult};

/// Experience a season of teaching gives before the teacher's ceiling.
pub(crate) fn teaching_quality(input: &ResolverInput<'_>) -> u32 {
    let teacher = input.character;
    let bonus = teacher.characteristic(Characteristic::Communication)
        + i32::try_from(teacher.ability_score(TEACHING)).unwrap_or(i32::MAX);
    let quality = i64::from(input.config.teaching_base) + i64::from(bonus);
    u32::try_from(quality.max(1)).unwrap_or(u32::MAX)
}

pub(super) fn resolve(input: &ResolverInput<'_>) -> SeasonResult<Resolution> {
    let Activity::Teach { student, subject } = input.activity() else {
        return Err(input.unmet("not a teaching activity"));
    };
    let learner = input
        .partner
        .filter(|p| p.name == *student && p.is_alive())
        .ok_or_else(|| SeasonError::StudentUnavailable {
            teacher: input.character.name.clone(),
            student: student.clone(),
            slot: input.slot(),
        })?;

    let ceiling = subject.xp_for_score(input.character.score(subject));
    let headroom = ceiling.saturating_sub(learner.xp(subject));
    let gain = teaching_quality(input).min(headroom);

    let delta = SeasonDelta {
        partner_xp: vec![(subject.clone(), gain)],
        xp: vec![(Subject::Ability(TEACHING.into()), input.config.exposure_xp)],
        ..SeasonDelta::default()
    };
    Ok(Resolution::new(
        delta,
        format!("taught {subject} to {student}: {gain} xp"),
    ))
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::{entry, input, magus};
    use super::*;
    use crate::config::SeasonConfig;
    use ars_core::{Art, Character};

    fn teach(student: &str) -> Activity {
        Activity::Teach {
            student: student.into(),
            subject: Subject::Art(Art::Creo),
        }
    }

    #[test]
    fn quality_uses_communication_and_teaching() {
        let config = SeasonConfig::default();
        let teacher = magus();
        let entry = entry(teach("Fenicia"));
        // 3 + Com 1 + Teaching 2
        assert_eq!(teaching_quality(&input(&teacher, &entry, None, &config)), 6);
    }

    #[test]
    fn gain_is_bounded_by_teacher_score() {
        let config = SeasonConfig::default();
        let teacher = magus();
        // Creo 10 is 55 xp; the student sits at 52.
        let mut student = Character::new("Fenicia");
        student.arts.insert(Art::Creo, 52);
        let entry = entry(teach("Fenicia"));
        let mut inp = input(&teacher, &entry, None, &config);
        inp.partner = Some(&student);

        let res = resolve(&inp).unwrap();
        assert_eq!(res.delta.partner_xp, vec![(Subject::Art(Art::Creo), 3)]);
        assert_eq!(student.xp(&Subject::Art(Art::Creo)) + 3, 55);
    }

    #[test]
    fn missing_student_is_unavailable() {
        let config = SeasonConfig::default();
        let teacher = magus();
        let someone_else = Character::new("Grimgroth");
        let entry = entry(teach("Fenicia"));
        let mut inp = input(&teacher, &entry, None, &config);
        assert!(matches!(
            resolve(&inp),
            Err(SeasonError::StudentUnavailable { .. })
        ));
        inp.partner = Some(&someone_else);
        assert!(matches!(
            resolve(&inp),
            Err(SeasonError::StudentUnavailable { .. })
        ));
    }
}
