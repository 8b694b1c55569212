pub mod auth;
pub mod doctor;
pub mod history;
pub mod leaderboard;
pub mod scan;
pub mod status;
