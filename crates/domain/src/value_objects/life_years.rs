//! Chronology of a generated couple.
//!
//! Years are drawn top-down: the child's birth year is known, and the
//! parents' birth, shared marriage and death years are drawn relative to it.
//! Randomness is injected as a `roll(min, max)` closure returning a value in
//! the inclusive range, so callers decide where the numbers come from.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// A parent is born at least this many years before the child.
pub const MIN_PARENT_AGE_GAP: i32 = 19;
pub const MAX_PARENT_AGE_GAP: i32 = 50;
pub const MIN_MARRIAGE_AGE: i32 = 18;
/// Upper bound on how long after the earliest legal date a couple marries.
pub const MAX_MARRIAGE_DELAY: i32 = 22;
pub const MIN_LIFESPAN: i32 = 19;
pub const MAX_LIFESPAN: i32 = 109;
pub const MIN_ROOT_AGE: i32 = 18;
pub const MAX_ROOT_AGE: i32 = 60;

/// Birth year for the root person, who is assumed alive in `current_year`.
pub fn root_birth_year(current_year: i32, mut roll: impl FnMut(i32, i32) -> i32) -> i32 {
    current_year - roll(MIN_ROOT_AGE, MAX_ROOT_AGE)
}

/// Birth, marriage and death years of one synthetic person.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifeYears {
    pub birth: i32,
    pub marriage: i32,
    pub death: i32,
}

impl LifeYears {
    /// Check the years against the birth year of this person's child.
    pub fn validate(&self, child_birth: i32) -> Result<(), DomainError> {
        let gap = child_birth - self.birth;
        if gap < MIN_PARENT_AGE_GAP {
            return Err(DomainError::constraint(format!(
                "parent born {} is only {} years older than child born {}",
                self.birth, gap, child_birth
            )));
        }

        let lifespan = self.death - self.birth;
        if !(MIN_LIFESPAN..=MAX_LIFESPAN).contains(&lifespan) {
            return Err(DomainError::constraint(format!(
                "lifespan of {} years is outside {}..={}",
                lifespan, MIN_LIFESPAN, MAX_LIFESPAN
            )));
        }

        if self.marriage - self.birth < MIN_MARRIAGE_AGE {
            return Err(DomainError::constraint(format!(
                "married in {} at age {}",
                self.marriage,
                self.marriage - self.birth
            )));
        }

        if self.death <= self.marriage {
            return Err(DomainError::constraint(format!(
                "died in {} before or at marriage in {}",
                self.death, self.marriage
            )));
        }

        Ok(())
    }
}

/// The years of a father/mother pair, married in the same year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoupleYears {
    pub father: LifeYears,
    pub mother: LifeYears,
}

impl CoupleYears {
    /// Draw parent years for a child born in `child_birth`.
    ///
    /// With an in-range `roll`, the result always passes [`Self::validate`]:
    /// - both parents are 19..=50 years older than the child
    /// - they marry no earlier than the younger one's 18th birthday and no
    ///   later than the child's birth
    /// - each dies after the marriage and after the child's birth, within
    ///   a 19..=109 year lifespan
    pub fn draw(child_birth: i32, mut roll: impl FnMut(i32, i32) -> i32) -> Self {
        let father_birth = child_birth - roll(MIN_PARENT_AGE_GAP, MAX_PARENT_AGE_GAP);
        let mother_birth = child_birth - roll(MIN_PARENT_AGE_GAP, MAX_PARENT_AGE_GAP);

        let earliest_marriage = father_birth.max(mother_birth) + MIN_MARRIAGE_AGE;
        let slack = (child_birth - earliest_marriage).clamp(0, MAX_MARRIAGE_DELAY);
        let marriage = earliest_marriage + roll(0, slack);

        let mut death_for = |birth: i32| {
            let min_age = MIN_LIFESPAN
                .max(marriage - birth + 1)
                .max(child_birth - birth);
            birth + roll(min_age, MAX_LIFESPAN)
        };
        let father_death = death_for(father_birth);
        let mother_death = death_for(mother_birth);

        Self {
            father: LifeYears {
                birth: father_birth,
                marriage,
                death: father_death,
            },
            mother: LifeYears {
                birth: mother_birth,
                marriage,
                death: mother_death,
            },
        }
    }

    pub fn validate(&self, child_birth: i32) -> Result<(), DomainError> {
        if self.father.marriage != self.mother.marriage {
            return Err(DomainError::constraint(format!(
                "spouses married in different years: {} and {}",
                self.father.marriage, self.mother.marriage
            )));
        }
        self.father.validate(child_birth)?;
        self.mother.validate(child_birth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn seeded_roll(seed: u64) -> impl FnMut(i32, i32) -> i32 {
        let mut rng = StdRng::seed_from_u64(seed);
        move |min, max| rng.gen_range(min..=max)
    }

    #[test]
    fn drawn_years_satisfy_constraints_for_any_seed() {
        for seed in 0..2_000 {
            let child_birth = 1990;
            let couple = CoupleYears::draw(child_birth, seeded_roll(seed));
            couple
                .validate(child_birth)
                .unwrap_or_else(|e| panic!("seed {seed}: {e}"));
            for parent in [couple.father, couple.mother] {
                assert!(child_birth - parent.birth > 18);
                assert!(parent.death - parent.birth > 18);
                assert!(parent.death - parent.birth < 110);
                assert!(parent.marriage - parent.birth >= 18);
                assert!(parent.death > parent.marriage);
                assert!(parent.marriage <= child_birth);
            }
        }
    }

    #[test]
    fn minimum_rolls_give_tightest_valid_couple() {
        let couple = CoupleYears::draw(2000, |min, _| min);
        assert_eq!(couple.father.birth, 1981);
        assert_eq!(couple.mother.birth, 1981);
        assert_eq!(couple.father.marriage, 1999);
        assert_eq!(couple.father.death, 2000);
        assert!(couple.validate(2000).is_ok());
    }

    #[test]
    fn maximum_rolls_stay_in_bounds() {
        let couple = CoupleYears::draw(2000, |_, max| max);
        assert_eq!(couple.father.birth, 1950);
        assert_eq!(couple.father.marriage, 1968 + 22);
        assert_eq!(couple.father.death, 1950 + MAX_LIFESPAN);
        assert!(couple.validate(2000).is_ok());
    }

    #[test]
    fn out_of_range_roll_fails_validation() {
        let couple = CoupleYears::draw(2000, |_, _| 5);
        let err = couple.validate(2000).expect_err("should fail");
        assert!(matches!(err, DomainError::Constraint(_)));
    }

    #[test]
    fn validate_rejects_death_before_marriage() {
        let years = LifeYears {
            birth: 1900,
            marriage: 1930,
            death: 1930,
        };
        assert!(years.validate(1950).is_err());
    }

    #[test]
    fn root_birth_year_subtracts_age() {
        assert_eq!(root_birth_year(2026, |min, _| min), 2026 - MIN_ROOT_AGE);
        assert_eq!(root_birth_year(2026, |_, max| max), 2026 - MAX_ROOT_AGE);
    }
}
