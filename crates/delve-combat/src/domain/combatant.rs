//! Per-combatant state and status effects.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::attribute::{Attribute, Attributes};
use super::error::CombatError;
use super::rules::defeat_threshold_for_rating;

/// Whether a fighter is controlled by a player or is a creature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombatantKind {
    /// A player character.
    #[default]
    Player,
    /// A creature from the bestiary.
    Creature,
}

/// A timed modifier on a combatant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusEffect {
    /// Defense rolls use two dice and keep the higher one. Consumed by the
    /// first incoming attack.
    Evading,
    /// The holder leaves the fight at the start of their next turn unless a
    /// successful attack lands first.
    Escaping,
}

impl fmt::Display for StatusEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusEffect::Evading => f.write_str("evading"),
            StatusEffect::Escaping => f.write_str("escaping"),
        }
    }
}

/// Where a combatant stands in the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Standing {
    /// Still fighting.
    Active,
    /// Damage reached the defeat threshold.
    Defeated,
    /// Left the fight undefeated.
    Escaped,
}

/// Everything needed to enter a combatant into a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombatantSpec {
    /// Caller-assigned identifier.
    pub id: Uuid,
    /// Display name, unique within the session.
    pub name: String,
    /// Player or creature.
    #[serde(default)]
    pub kind: CombatantKind,
    /// Attribute scores.
    pub attributes: Attributes,
    /// Damage at which the combatant is defeated. Falls back to the
    /// health rating, then to the session rules, when absent.
    #[serde(default)]
    pub defeat_threshold: Option<u32>,
    /// Health rating from 1 to 10, converted with
    /// [`defeat_threshold_for_rating`].
    #[serde(default)]
    pub health_rating: Option<u32>,
}

impl CombatantSpec {
    /// A player spec with the rules' default threshold.
    #[must_use]
    pub fn player(id: Uuid, name: impl Into<String>, attributes: Attributes) -> Self {
        Self {
            id,
            name: name.into(),
            kind: CombatantKind::Player,
            attributes,
            defeat_threshold: None,
            health_rating: None,
        }
    }

    /// A creature spec with the rules' default threshold.
    #[must_use]
    pub fn creature(id: Uuid, name: impl Into<String>, attributes: Attributes) -> Self {
        Self {
            kind: CombatantKind::Creature,
            ..Self::player(id, name, attributes)
        }
    }

    /// Sets an explicit defeat threshold.
    #[must_use]
    pub fn with_defeat_threshold(mut self, threshold: u32) -> Self {
        self.defeat_threshold = Some(threshold);
        self
    }

    /// Sets a health rating.
    #[must_use]
    pub fn with_health_rating(mut self, rating: u32) -> Self {
        self.health_rating = Some(rating);
        self
    }
}

/// Mutable state of one fighter within a session.
#[derive(Debug, Clone)]
pub struct Combatant {
    id: Uuid,
    name: String,
    kind: CombatantKind,
    attributes: Attributes,
    momentum: u32,
    damage_taken: u32,
    defeat_threshold: u32,
    /// Active statuses keyed by effect, valued by the turn they were applied.
    statuses: BTreeMap<StatusEffect, u64>,
    standing: Standing,
}

impl Combatant {
    pub(crate) fn from_spec(spec: CombatantSpec, default_threshold: u32) -> Self {
        Self {
            id: spec.id,
            name: spec.name,
            kind: spec.kind,
            attributes: spec.attributes,
            momentum: 0,
            damage_taken: 0,
            defeat_threshold: spec
                .defeat_threshold
                .or_else(|| spec.health_rating.map(defeat_threshold_for_rating))
                .unwrap_or(default_threshold),
            statuses: BTreeMap::new(),
            standing: Standing::Active,
        }
    }

    /// Combatant identifier.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Player or creature.
    #[must_use]
    pub fn kind(&self) -> CombatantKind {
        self.kind
    }

    /// Attribute scores.
    #[must_use]
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Score for a single attribute.
    #[must_use]
    pub fn score(&self, attribute: Attribute) -> u32 {
        self.attributes.score(attribute)
    }

    /// Current momentum.
    #[must_use]
    pub fn momentum(&self) -> u32 {
        self.momentum
    }

    /// Cumulative damage taken.
    #[must_use]
    pub fn damage_taken(&self) -> u32 {
        self.damage_taken
    }

    /// Damage at which this combatant is defeated.
    #[must_use]
    pub fn defeat_threshold(&self) -> u32 {
        self.defeat_threshold
    }

    /// Current standing.
    #[must_use]
    pub fn standing(&self) -> Standing {
        self.standing
    }

    /// True while the combatant is still fighting.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.standing == Standing::Active
    }

    /// True if `effect` is active.
    #[must_use]
    pub fn has_status(&self, effect: StatusEffect) -> bool {
        self.statuses.contains_key(&effect)
    }

    /// Turn on which `effect` was applied, if active.
    #[must_use]
    pub fn status_applied_on(&self, effect: StatusEffect) -> Option<u64> {
        self.statuses.get(&effect).copied()
    }

    /// Active statuses in a stable order.
    pub fn statuses(&self) -> impl Iterator<Item = StatusEffect> + '_ {
        self.statuses.keys().copied()
    }

    /// Applies `effect` stamped with `turn`. Returns `true` if the effect was
    /// already active and only its stamp was refreshed.
    pub(crate) fn apply_status(&mut self, effect: StatusEffect, turn: u64) -> bool {
        self.statuses.insert(effect, turn).is_some()
    }

    /// Removes `effect`, returning whether it was active.
    pub(crate) fn remove_status(&mut self, effect: StatusEffect) -> bool {
        self.statuses.remove(&effect).is_some()
    }

    pub(crate) fn gain_momentum(&mut self, amount: u32) {
        self.momentum = self.momentum.saturating_add(amount);
    }

    /// Spends `amount` momentum, returning what is left.
    ///
    /// # Errors
    ///
    /// Returns `CombatError::InsufficientMomentum` and leaves momentum
    /// untouched if less than `amount` is held.
    pub(crate) fn spend_momentum(&mut self, amount: u32) -> Result<u32, CombatError> {
        if self.momentum < amount {
            return Err(CombatError::InsufficientMomentum {
                required: amount,
                available: self.momentum,
            });
        }
        self.momentum -= amount;
        Ok(self.momentum)
    }

    /// Records damage. Returns `true` if this damage defeated the combatant.
    pub(crate) fn take_damage(&mut self, amount: u32) -> bool {
        self.damage_taken = self.damage_taken.saturating_add(amount);
        if self.is_alive() && self.damage_taken >= self.defeat_threshold {
            self.standing = Standing::Defeated;
            self.statuses.clear();
            return true;
        }
        false
    }

    pub(crate) fn mark_escaped(&mut self) {
        self.standing = Standing::Escaped;
        self.statuses.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fighter(threshold: u32) -> Combatant {
        Combatant::from_spec(
            CombatantSpec::player(Uuid::new_v4(), "Aldric", Attributes::new(5, 3, 2)),
            threshold,
        )
    }

    #[test]
    fn test_new_combatant_starts_fresh() {
        let c = fighter(10);
        assert_eq!(c.momentum(), 0);
        assert_eq!(c.damage_taken(), 0);
        assert_eq!(c.defeat_threshold(), 10);
        assert!(c.is_alive());
        assert_eq!(c.statuses().count(), 0);
    }

    #[test]
    fn test_health_rating_derives_threshold() {
        let spec = CombatantSpec::player(Uuid::new_v4(), "Aldric", Attributes::new(5, 3, 2))
            .with_health_rating(3);
        assert_eq!(Combatant::from_spec(spec, 10).defeat_threshold(), 8);
    }

    #[test]
    fn test_explicit_threshold_overrides_default() {
        let spec = CombatantSpec::creature(Uuid::new_v4(), "Goblin", Attributes::new(2, 4, 1))
            .with_defeat_threshold(6);
        let c = Combatant::from_spec(spec, 10);
        assert_eq!(c.defeat_threshold(), 6);
        assert_eq!(c.kind(), CombatantKind::Creature);
    }

    #[test]
    fn test_spend_momentum_rejects_overspend_without_change() {
        let mut c = fighter(10);
        c.gain_momentum(4);

        let result = c.spend_momentum(5);

        assert_eq!(
            result,
            Err(CombatError::InsufficientMomentum {
                required: 5,
                available: 4
            })
        );
        assert_eq!(c.momentum(), 4);
    }

    #[test]
    fn test_spend_momentum_returns_remaining() {
        let mut c = fighter(10);
        c.gain_momentum(7);
        assert_eq!(c.spend_momentum(5), Ok(2));
        assert_eq!(c.momentum(), 2);
    }

    #[test]
    fn test_reapplying_status_refreshes_instead_of_stacking() {
        let mut c = fighter(10);
        assert!(!c.apply_status(StatusEffect::Evading, 1));
        assert!(c.apply_status(StatusEffect::Evading, 3));

        assert_eq!(c.statuses().count(), 1);
        assert_eq!(c.status_applied_on(StatusEffect::Evading), Some(3));
    }

    #[test]
    fn test_damage_reaching_threshold_defeats() {
        let mut c = fighter(6);
        c.apply_status(StatusEffect::Escaping, 1);

        assert!(!c.take_damage(4));
        assert!(c.is_alive());
        assert!(c.take_damage(2));
        assert_eq!(c.standing(), Standing::Defeated);
        assert!(!c.has_status(StatusEffect::Escaping));
    }

    #[test]
    fn test_escape_clears_statuses() {
        let mut c = fighter(10);
        c.apply_status(StatusEffect::Escaping, 2);
        c.mark_escaped();
        assert_eq!(c.standing(), Standing::Escaped);
        assert!(!c.is_alive());
        assert_eq!(c.statuses().count(), 0);
    }
}
