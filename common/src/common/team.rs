use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString, FromRepr};

use super::Player;
use crate::Rc;
use crate::directory::{Roster, StateDirectory};
use crate::entity::{Entity, PropertyPath, int_prop, string_prop};

/// Side a player or team plays on, as stored in `m_iTeamNum`.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    FromRepr,
)]
#[repr(u8)]
pub enum Team {
    #[default]
    Unassigned = 0,
    Spectators = 1,
    #[strum(serialize = "T")]
    Terrorists = 2,
    #[strum(serialize = "CT")]
    CounterTerrorists = 3,
}

impl Team {
    pub fn from_team_num(num: i32) -> Team {
        u8::try_from(num)
            .ok()
            .and_then(Team::from_repr)
            .unwrap_or_default()
    }

    /// The side playing against this one. Only the two playing sides have one.
    pub fn opponent(self) -> Option<Team> {
        match self {
            Team::Terrorists => Some(Team::CounterTerrorists),
            Team::CounterTerrorists => Some(Team::Terrorists),
            Team::Unassigned | Team::Spectators => None,
        }
    }
}

const TEAM_NUM: PropertyPath = PropertyPath::from_static("m_iTeamNum");
const S1_SCORE: PropertyPath = PropertyPath::from_static("m_scoreTotal");
const S2_SCORE: PropertyPath = PropertyPath::from_static("m_iScore");
const CLAN_NAME: PropertyPath = PropertyPath::from_static("m_szClanTeamname");
const FLAG_IMAGE: PropertyPath = PropertyPath::from_static("m_szTeamFlagImage");

/// State of one team side.
///
/// Membership is asked from the [`Roster`] on every call, so a `TeamState`
/// created early in a demo stays correct through roster changes and side swaps.
pub struct TeamState {
    team: Team,
    entity: Option<Rc<dyn Entity>>,
    roster: Rc<dyn Roster>,
    directory: Rc<dyn StateDirectory>,
}

impl std::fmt::Debug for TeamState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TeamState")
            .field("team", &self.team)
            .field("entity", &self.entity)
            .finish_non_exhaustive()
    }
}

impl TeamState {
    pub fn new(team: Team, roster: Rc<dyn Roster>, directory: Rc<dyn StateDirectory>) -> Self {
        Self {
            team,
            entity: None,
            roster,
            directory,
        }
    }

    pub fn set_entity(&mut self, entity: Option<Rc<dyn Entity>>) {
        self.entity = entity;
    }

    pub fn entity(&self) -> Option<&Rc<dyn Entity>> {
        self.entity.as_ref()
    }

    pub fn team(&self) -> Team {
        self.team
    }

    pub fn opponent(&self) -> Option<Team> {
        self.team.opponent()
    }

    /// Team number as networked on the team entity.
    pub fn id(&self) -> i32 {
        int_prop(self.entity.as_deref(), &TEAM_NUM)
    }

    pub fn score(&self) -> i32 {
        if self.directory.is_source2() {
            return int_prop(self.entity.as_deref(), &S2_SCORE);
        }
        int_prop(self.entity.as_deref(), &S1_SCORE)
    }

    pub fn clan_name(&self) -> String {
        string_prop(self.entity.as_deref(), &CLAN_NAME)
    }

    pub fn flag(&self) -> String {
        string_prop(self.entity.as_deref(), &FLAG_IMAGE)
    }

    /// Players on this side as of the current tick.
    pub fn members(&self) -> Vec<Rc<Player>> {
        self.roster.members(self.team)
    }

    /// Saturates instead of overflowing on corrupt values.
    fn sum(&self, value: impl Fn(&Player) -> i64) -> i64 {
        self.members()
            .iter()
            .map(|p| value(p.as_ref()))
            .fold(0, i64::saturating_add)
    }

    pub fn current_equipment_value(&self) -> i64 {
        self.sum(Player::equipment_value_current)
    }

    pub fn round_start_equipment_value(&self) -> i64 {
        self.sum(Player::equipment_value_round_start)
    }

    pub fn freeze_time_end_equipment_value(&self) -> i64 {
        self.sum(Player::equipment_value_freeze_time_end)
    }

    pub fn money_spent_this_round(&self) -> i64 {
        self.sum(Player::money_spent_this_round)
    }

    pub fn money_spent_total(&self) -> i64 {
        self.sum(Player::money_spent_total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn team_from_number() {
        assert_eq!(Team::Terrorists, Team::from_team_num(2));
        assert_eq!(Team::CounterTerrorists, Team::from_team_num(3));
        assert_eq!(Team::Unassigned, Team::from_team_num(-1));
        assert_eq!(Team::Unassigned, Team::from_team_num(42));
    }

    #[test]
    fn opponents() {
        assert_eq!(Some(Team::CounterTerrorists), Team::Terrorists.opponent());
        assert_eq!(Some(Team::Terrorists), Team::CounterTerrorists.opponent());
        assert_eq!(None, Team::Spectators.opponent());
    }

    #[test]
    fn team_names() {
        assert_eq!("CT", Team::CounterTerrorists.to_string());
        assert_eq!(Team::Terrorists, "T".parse::<Team>().unwrap());
    }
}
