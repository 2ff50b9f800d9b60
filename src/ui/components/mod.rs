pub mod menu;
pub mod progress_bar;
pub mod question_view;
pub mod report_view;
pub mod scoreboard;
