use std::{
    fs,
    path::{Path, PathBuf},
};

use tempfile::tempdir;

use viewpack::{ViewpackError, bundle::BundleImage, diagnostics::ErrorCode};
use viewpack_cli::{Args, error_adapter::to_reportables, run};

/// Demo projects live at the workspace root, relative to workspace not the crate
fn demos_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("demos")
}

/// Collects every directory under `dir` that holds a `Views` tree
fn collect_view_roots(dir: &Path) -> Vec<PathBuf> {
    let mut roots: Vec<PathBuf> = if let Ok(entries) = fs::read_dir(dir) {
        entries
            .flatten()
            .map(|entry| entry.path().join("Views"))
            .filter(|path| path.is_dir())
            .collect()
    } else {
        Vec::new()
    };

    // Sort for consistent test output
    roots.sort();
    roots
}

fn args_for(views: &Path, output: &Path, app_name: &str) -> Args {
    Args {
        input: Some(views.to_string_lossy().to_string()),
        output: Some(output.to_string_lossy().to_string()),
        app_name: Some(app_name.to_string()),
        log_level: "off".to_string(),
        ..Args::default()
    }
}

#[test]
fn e2e_smoke_test_valid_demos() {
    let temp_dir = tempdir().expect("Failed to create temp directory");

    let valid_roots = collect_view_roots(&demos_path());
    assert!(!valid_roots.is_empty(), "No demo projects found in demos/");

    let mut failed = Vec::new();

    for views in &valid_roots {
        let project = views.parent().unwrap().file_name().unwrap().to_string_lossy();
        let output_path = temp_dir.path().join(format!("{project}.vpk"));
        let args = args_for(views, &output_path, &project);

        match run(&args) {
            Ok(output) => {
                let bundle = BundleImage::decode(&fs::read(&output_path).unwrap()).unwrap();
                assert_eq!(bundle.assembly_name, format!("{project}.PrecompiledViews"));
                assert!(!output.views().is_empty());
            }
            Err(e) => failed.push((views.clone(), e)),
        }
    }

    if !failed.is_empty() {
        eprintln!("\nDemo projects that failed:");
        for (path, err) in &failed {
            eprintln!("  - {}: {}", path.display(), err);
        }
        panic!("{} demo project(s) failed unexpectedly", failed.len());
    }

    println!("✅ All {} demo projects passed", valid_roots.len());
}

#[test]
fn e2e_smoke_test_invalid_demos() {
    let temp_dir = tempdir().expect("Failed to create temp directory");

    let invalid_roots = collect_view_roots(&demos_path().join("invalid"));
    assert!(
        !invalid_roots.is_empty(),
        "No invalid demo projects found in demos/invalid/"
    );

    for views in &invalid_roots {
        let output_path = temp_dir.path().join("invalid.vpk");
        let args = args_for(views, &output_path, "Invalid");

        let err = run(&args).expect_err("invalid demo should fail");
        assert!(
            matches!(err, ViewpackError::Compilation(_)),
            "{}: unexpected error {err:?}",
            views.display()
        );
        assert!(!to_reportables(&err).is_empty());
        assert!(!output_path.exists(), "{} wrote output", views.display());
    }
}

#[test]
fn e2e_config_file_supplies_identity_and_symbols() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let shop = demos_path().join("shop");
    let output_path = temp_dir.path().join("shop.vpk");

    let args = Args {
        input: Some(shop.join("Views").to_string_lossy().to_string()),
        output: Some(output_path.to_string_lossy().to_string()),
        config: Some(shop.join("viewpack/config.toml").to_string_lossy().to_string()),
        log_level: "off".to_string(),
        ..Args::default()
    };

    let output = run(&args).unwrap();
    let paths: Vec<_> = output
        .views()
        .iter()
        .map(|v| v.logical_path().as_str())
        .collect();
    assert_eq!(
        paths,
        ["Home/About", "Home/Index", "Orders/Details", "Shared/_Layout"]
    );

    let bundle = BundleImage::decode(&fs::read(&output_path).unwrap()).unwrap();
    assert_eq!(bundle.assembly_name, "Shop.PrecompiledViews");
    assert_eq!(bundle.symbols, ["SHOP"]);
    assert!(bundle.attributes[0].contains("\"2.0.0.0\""));
}

#[test]
fn e2e_info_diagnostics_do_not_fail_the_run() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let output_path = temp_dir.path().join("blog.vpk");
    let args = args_for(&demos_path().join("blog/Views"), &output_path, "Blog");

    let output = run(&args).unwrap();
    assert!(
        output
            .diagnostics()
            .iter()
            .any(|d| d.code() == Some(ErrorCode::V002))
    );
    assert!(output_path.exists());
}

#[test]
fn e2e_missing_app_name_is_a_configuration_error() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let args = Args {
        input: Some(demos_path().join("shop/Views").to_string_lossy().to_string()),
        output: Some(temp_dir.path().join("x.vpk").to_string_lossy().to_string()),
        config: Some(temp_dir.path().join("absent.toml").to_string_lossy().to_string()),
        log_level: "off".to_string(),
        ..Args::default()
    };

    let err = run(&args).unwrap_err();
    assert!(matches!(err, ViewpackError::Config(_)));
}
