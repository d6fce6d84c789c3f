//! Contract module containing the traits external collaborators implement

mod series_adapter;
mod value_formatter;

pub use series_adapter::SeriesAdapter;
pub use value_formatter::ValueFormatter;
