use cncforge_core::{Controller, Error, OptionsError, ProgramError};
use cncforge_optimizer::{optimize, optimize_for, OptimizationOptions, Preset};

fn basic() -> OptimizationOptions {
    OptimizationOptions::preset(Preset::Basic, Controller::Generic)
}

#[test]
fn test_unknown_controller() {
    let err = optimize("G0 X1", "sinumerik", &basic()).unwrap_err();
    assert!(matches!(
        err,
        Error::Program(ProgramError::UnknownController { ref name, .. }) if name == "sinumerik"
    ));
    assert!(err.to_string().contains("fanuc, heidenhain"));
}

#[test]
fn test_empty_programs() {
    for source in ["", "   \n\t\n", "(only a comment)\n; and another", "%\n%"] {
        let err = optimize(source, "generic", &basic()).unwrap_err();
        assert_eq!(err, Error::Program(ProgramError::Empty), "{:?}", source);
    }
}

#[test]
fn test_options_must_fit_controller() {
    let fanuc = OptimizationOptions::preset(Preset::Speed, Controller::Fanuc);
    let err = optimize_for("G0 X1", Controller::Heidenhain, &fanuc).unwrap_err();
    assert!(err.is_options_error());
    assert!(matches!(err, Error::Options(OptionsError::Incompatible(_))));
}

#[test]
fn test_generic_options_retarget_to_any_controller() {
    for controller in Controller::ALL {
        let result = optimize_for("G0 X1\nG1 X2 F100", controller, &basic());
        assert!(result.is_ok(), "{}", controller);
    }
}
