//! Turn order and win condition rules.
//!
//! Both rules only need a handful of facts about each participant, so they
//! are written against the [`Contender`] trait and stay independent of how
//! the runtime stores combatants.

/// The facts turn ordering and win checking need about a participant.
pub trait Contender {
    fn speed(&self) -> i32;
    fn is_hero(&self) -> bool;
    fn is_knocked_out(&self) -> bool;
    fn has_fled(&self) -> bool;
}

/// How a battle ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum Outcome {
    /// Every foe is gone or knocked out.
    Allies,
    /// Every ally is gone or knocked out. Wins over [`Outcome::Allies`].
    Foes,
    /// An ally escaped.
    Fled,
}

/// Orders a pool of contenders for one round.
///
/// Knocked-out contenders are dropped. The rest are sorted by descending
/// speed; on equal speed heroes go first, and remaining ties keep pool order.
/// The pool is not modified.
pub fn turn_order<T>(pool: &[T]) -> Vec<T>
where
    T: Contender + Clone,
{
    let mut order: Vec<T> = pool
        .iter()
        .filter(|contender| !contender.is_knocked_out())
        .cloned()
        .collect();

    // sort_by is stable
    order.sort_by(|a, b| {
        b.speed()
            .cmp(&a.speed())
            .then_with(|| b.is_hero().cmp(&a.is_hero()))
    });
    order
}

/// Decides whether the battle is over.
///
/// Checked in this order: allies gone ⇒ [`Outcome::Foes`], foes gone ⇒
/// [`Outcome::Allies`], any ally fled ⇒ [`Outcome::Fled`]. A side is gone
/// when its roster is empty or every member is knocked out.
pub fn win_condition<T: Contender>(allies: &[T], foes: &[T]) -> Option<Outcome> {
    let defeated = |side: &[T]| side.iter().all(Contender::is_knocked_out);

    if defeated(allies) {
        Some(Outcome::Foes)
    } else if defeated(foes) {
        Some(Outcome::Allies)
    } else if allies.iter().any(Contender::has_fled) {
        Some(Outcome::Fled)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[derive(Clone, Debug, PartialEq)]
    struct Mock {
        id: &'static str,
        speed: i32,
        hero: bool,
        ko: bool,
        fled: bool,
    }

    impl Mock {
        fn new(id: &'static str, speed: i32) -> Self {
            Self {
                id,
                speed,
                hero: false,
                ko: false,
                fled: false,
            }
        }

        fn hero(mut self) -> Self {
            self.hero = true;
            self
        }

        fn ko(mut self) -> Self {
            self.ko = true;
            self
        }
    }

    impl Contender for Mock {
        fn speed(&self) -> i32 {
            self.speed
        }
        fn is_hero(&self) -> bool {
            self.hero
        }
        fn is_knocked_out(&self) -> bool {
            self.ko
        }
        fn has_fled(&self) -> bool {
            self.fled
        }
    }

    #[test]
    fn orders_by_speed_with_hero_tiebreak() {
        let pool = vec![
            Mock::new("ally0", 2),
            Mock::new("ally1", 4),
            Mock::new("ally2", 3).hero(),
            Mock::new("ally3", 6).hero().ko(),
            Mock::new("foe0", 3),
            Mock::new("foe1", 5),
            Mock::new("foe2", 6).ko(),
        ];

        let ids: Vec<_> = turn_order(&pool).into_iter().map(|m| m.id).collect();
        assert_eq!(ids, ["foe1", "ally1", "ally2", "foe0", "ally0"]);
    }

    #[test]
    fn hero_wins_tie_even_when_listed_last() {
        let pool = vec![Mock::new("foe", 3), Mock::new("hero", 3).hero()];
        let ids: Vec<_> = turn_order(&pool).into_iter().map(|m| m.id).collect();
        assert_eq!(ids, ["hero", "foe"]);
    }

    #[test]
    fn win_condition_cases() {
        let ally = Mock::new("ally", 1);
        let foe = Mock::new("foe", 1);

        assert_eq!(win_condition(&[ally.clone()], &[foe.clone()]), None);
        assert_eq!(
            win_condition(&[ally.clone().ko()], &[foe.clone()]),
            Some(Outcome::Foes)
        );
        assert_eq!(
            win_condition(&[ally.clone()], &[foe.clone().ko()]),
            Some(Outcome::Allies)
        );
        assert_eq!(win_condition(&[], &[foe.clone()]), Some(Outcome::Foes));
        assert_eq!(win_condition(&[ally.clone()], &[]), Some(Outcome::Allies));

        let mut fled = ally.clone();
        fled.fled = true;
        assert_eq!(win_condition(&[fled], &[foe.clone()]), Some(Outcome::Fled));
    }

    #[test]
    fn everyone_knocked_out_means_foes_win() {
        let ally = Mock::new("ally", 1).ko();
        let foe = Mock::new("foe", 1).ko();
        assert_eq!(win_condition(&[ally], &[foe]), Some(Outcome::Foes));

        let empty: [Mock; 0] = [];
        assert_eq!(win_condition(&empty, &empty), Some(Outcome::Foes));
    }

    proptest! {
        #[test]
        fn order_is_sorted_and_excludes_knocked_out(
            entries in proptest::collection::vec((0i32..8, any::<bool>(), any::<bool>()), 0..16)
        ) {
            let pool: Vec<Mock> = entries
                .iter()
                .map(|&(speed, hero, ko)| Mock { id: "m", speed, hero, ko, fled: false })
                .collect();
            let order = turn_order(&pool);

            prop_assert!(order.iter().all(|m| !m.ko));
            prop_assert_eq!(order.len(), pool.iter().filter(|m| !m.ko).count());
            for pair in order.windows(2) {
                prop_assert!(pair[0].speed >= pair[1].speed);
                if pair[0].speed == pair[1].speed {
                    prop_assert!(pair[0].hero || !pair[1].hero);
                }
            }
        }
    }
}
