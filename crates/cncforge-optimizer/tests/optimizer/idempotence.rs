use cncforge_core::Controller;
use cncforge_optimizer::{optimize_for, OptimizationOptions, Preset};

fn sample_program() -> String {
    let mut text = String::from(
        "%\nO1000 (SAMPLE)\nG90 G17 G21\nG90\nT1 M6\nS8000 M3\n\
         G0 X0 Y0 Z10\nG0 X0 Y0 Z5\nG0 Z2\nG1 Z-1 F300\nG1 X10 Y0 F300\nX10 Y0\n",
    );
    for k in 1..=32 {
        let angle = std::f64::consts::FRAC_PI_2 * f64::from(k) / 32.0;
        text.push_str(&format!("X{:.4} Y{:.4}\n", 10.0 * angle.cos(), 10.0 * angle.sin()));
    }
    text.push_str(
        "G1 X0 Y20\nG2 X10 Y30 I10 J0\nG81 X40 Y40 Z-5 R2 F150\nX50\nG80\nG0 Z10\nM5\nM30\n%",
    );
    text
}

#[test]
fn test_second_pass_finds_nothing() {
    let source = sample_program();
    let controllers = [
        Controller::Fanuc,
        Controller::Heidenhain,
        Controller::Siemens,
        Controller::Generic,
    ];

    for controller in controllers {
        for preset in Preset::ALL {
            let options = OptimizationOptions::preset(preset, controller);
            let first = optimize_for(&source, controller, &options).unwrap();
            assert!(
                first.validation.is_valid,
                "{} / {}: {:?}",
                controller,
                preset,
                first.validation.errors
            );

            let second = optimize_for(&first.optimized_code, controller, &options).unwrap();
            assert_eq!(
                second.optimized_code, first.optimized_code,
                "{} / {}",
                controller, preset
            );
            assert!(
                second.improvements.is_empty(),
                "{} / {}: {:?}",
                controller,
                preset,
                second.improvements
            );
            assert_eq!(second.stats.reduction_percent, 0.0);
        }
    }
}

#[test]
fn test_arc_fitting_shrinks_program() {
    let source = sample_program();
    let options = OptimizationOptions::preset(Preset::Quality, Controller::Generic);
    let result = optimize_for(&source, Controller::Generic, &options).unwrap();

    assert!(result.optimized_code.contains("G3 X0.0000 Y10.0000 I-10 J0"));
    assert!(result.stats.optimized_lines + 30 < result.stats.original_lines);
    assert!(result.improvements.iter().any(|i| i.contains("arcs")));
}
