pub mod datasets_ui;
pub mod dialogs_ui;
pub mod plot_ui;
pub mod trace_look_ui;

pub use datasets_ui::MenuAction;
pub use plot_ui::render_tab;
