pub mod actions;
pub mod chart_view;
pub mod controls;
pub mod data_table;
pub mod insights_panel;
