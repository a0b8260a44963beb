//! Text renderers for the routed views.
//!
//! DESIGN
//! ======
//! Renderers are pure functions from fetched data to a `String`, so the shell
//! decides where output goes and tests can compare text directly.

pub mod calendar;
pub mod tasks;

use crate::router::View;

/// Static body for views that need no data.
#[must_use]
pub fn hint(view: View) -> &'static str {
    match view {
        View::Login => "Inicia sesión: tareas login --email <email> --password <password>",
        View::Register => "Crea una cuenta: tareas register --nombre <nombre> --email <email> --password <password>",
        View::Tasks => "Tareas: tareas open /tareas",
        View::Calendar => "Calendario: tareas open /calendario",
    }
}
