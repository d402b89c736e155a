//! Output file naming for optimized programs

use chrono::{Local, NaiveDate};
use cncforge_core::Controller;
use std::path::{Path, PathBuf};

/// File extension for a controller's programs
pub fn extension_for(controller: Controller) -> &'static str {
    match controller {
        Controller::Heidenhain => "h",
        _ => "nc",
    }
}

/// `<stem>_<controller>_<YYYYMMDD>.<h|nc>`
pub fn output_file_name(input: &Path, controller: Controller, date: NaiveDate) -> String {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("program");
    format!(
        "{}_{}_{}.{}",
        stem,
        controller.id(),
        date.format("%Y%m%d"),
        extension_for(controller)
    )
}

/// Dated output path inside `dir`, using today's local date
pub fn dated_output_path(dir: &Path, input: &Path, controller: Controller) -> PathBuf {
    dir.join(output_file_name(input, controller, Local::now().date_naive()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 7).unwrap()
    }

    #[test]
    fn test_iso_controller_name() {
        let name = output_file_name(Path::new("/jobs/bracket.nc"), Controller::Fanuc, date());
        assert_eq!(name, "bracket_fanuc_20240307.nc");
    }

    #[test]
    fn test_heidenhain_uses_h_extension() {
        let name = output_file_name(Path::new("plate.gcode"), Controller::Heidenhain, date());
        assert_eq!(name, "plate_heidenhain_20240307.h");
    }

    #[test]
    fn test_missing_stem_falls_back() {
        let name = output_file_name(Path::new("/"), Controller::Generic, date());
        assert_eq!(name, "program_generic_20240307.nc");
    }

    #[test]
    fn test_dated_path_stays_in_dir() {
        let path = dated_output_path(Path::new("out"), Path::new("a.nc"), Controller::Okuma);
        assert_eq!(path.parent(), Some(Path::new("out")));
        assert!(path.to_string_lossy().ends_with(".nc"));
    }
}
