pub mod challenge_panel;
pub mod dashboard;
pub mod feedback_panel;
pub mod menu;
pub mod progress_bar;
pub mod review_list;
pub mod stats_sidebar;
