mod console;
mod export;

pub use console::{ConsoleReporter, LiveView, format_row, format_status};
pub use export::{
    CsvExporter, HtmlExporter, JsonExporter, ReportWriter, TxtExporter, output_path,
};
