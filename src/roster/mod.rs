pub mod types;
pub mod eligibility;
pub mod config;
pub mod assignment;
pub mod reconcile;
pub mod transitions;

pub use types::RosterRow;
pub use eligibility::Position;
pub use config::{add_roster_slot, remove_roster_slot};
pub use reconcile::roster_view;
pub use transitions::{
    clear_selections, draft_to_my_team, release_player, reset_all, set_my_team_state,
    set_taken_state,
};
