//! Integration tests for project materialization

use newproject::{Config, MaterializeError, Materializer, Placeholders, PluginIdentity};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use walkdir::WalkDir;

const EXAMPLE_D: &str = r#"module example;

import dplug.core, dplug.client;

mixin(pluginEntryPoints!ExamplePlugin);

final class ExamplePlugin : dplug.client.Client
{
public:

    override PluginInfo buildPluginInfo()
    {
        PluginInfo info;
        info.isSynth = false;
        info.hasGUI = false;
        info.vendorName = "Witty Audio";
        info.vendorUniqueID = "Wity";
        info.pluginName = "ExamplePlugin";
        info.pluginUniqueID = "WiDi";
        info.receivesMIDI = false;
        // com.wittyaudio.ExamplePlugin
        return info;
    }
}
"#;

const PLUGIN_JSON: &str = r#"{
    "vendorName": "Witty Audio",
    "vendorUniqueID": "Wity",
    "pluginName": "ExamplePlugin",
    "pluginUniqueID": "WiDi",
    "CFBundleIdentifierPrefix": "com.wittyaudio",
    "isSynth": false,
    "receivesMIDI": false
}
"#;

const DUB_JSON: &str = r#"{
    "name": "ExamplePlugin",
    "description": "Example plugin by Witty Audio",
    "targetType": "dynamicLibrary",
    "dependencies": { "dplug:vst": "*" }
}
"#;

/// Lay out a template shaped like Dplug's example plugin
fn create_template(dir: &Path) {
    fs::create_dir_all(dir.join("gfx")).unwrap();
    fs::create_dir_all(dir.join("fonts")).unwrap();
    fs::write(dir.join("example.d"), EXAMPLE_D).unwrap();
    fs::write(dir.join("plugin.json"), PLUGIN_JSON).unwrap();
    fs::write(dir.join("dub.json"), DUB_JSON).unwrap();
    fs::write(dir.join("README.md"), "# ExamplePlugin\n").unwrap();
    fs::write(dir.join("gfx").join("knob.png"), b"\x89PNG\r\n\x1a\n\x00").unwrap();
    fs::write(dir.join("fonts").join("VeraBd.ttf"), b"\x00\x01\x00\x00").unwrap();
}

fn identity(name: &str) -> PluginIdentity {
    PluginIdentity {
        vendor_name: "Acme Audio".to_string(),
        vendor_id: "Acme".to_string(),
        plugin_name: name.to_string(),
        plugin_id: "AcBf".to_string(),
        bundle_id: "com.acme".to_string(),
        is_synth: false,
        receives_midi: false,
    }
}

fn relative_files(root: &Path) -> BTreeSet<PathBuf> {
    WalkDir::new(root)
        .min_depth(1)
        .into_iter()
        .map(|e| e.unwrap())
        .map(|e| e.path().strip_prefix(root).unwrap().to_path_buf())
        .collect()
}

struct Fixture {
    _tmp: TempDir,
    template: PathBuf,
    output: PathBuf,
}

fn fixture() -> Fixture {
    let tmp = TempDir::new().unwrap();
    let template = tmp.path().join("example-plugin");
    let output = tmp.path().join("out");
    create_template(&template);
    Fixture {
        _tmp: tmp,
        template,
        output,
    }
}

/// Destination mirrors the template with only the main source renamed
#[test]
fn test_file_set_matches_template() {
    let f = fixture();
    let report = Materializer::new(&f.template, &f.output)
        .materialize(&identity("Big Fuzz"))
        .unwrap();

    let dest = f.output.join("Big_Fuzz");
    assert_eq!(report.destination, dest);
    assert_eq!(report.main_source, "Big_Fuzz.d");

    let expected: BTreeSet<PathBuf> = relative_files(&f.template)
        .into_iter()
        .map(|p| {
            if p == Path::new("example.d") {
                PathBuf::from("Big_Fuzz.d")
            } else {
                p
            }
        })
        .collect();
    assert_eq!(relative_files(&dest), expected);
}

/// No placeholder token survives in the main source or plugin.json
#[test]
fn test_placeholders_fully_replaced() {
    let f = fixture();
    Materializer::new(&f.template, &f.output)
        .materialize(&identity("Big Fuzz"))
        .unwrap();
    let dest = f.output.join("Big_Fuzz");

    let placeholders = Placeholders::default();
    let tokens = [
        &placeholders.vendor_name,
        &placeholders.vendor_id,
        &placeholders.plugin_name,
        &placeholders.plugin_id,
        &placeholders.bundle_id,
    ];

    for file in ["Big_Fuzz.d", "plugin.json"] {
        let content = fs::read_to_string(dest.join(file)).unwrap();
        for token in tokens {
            assert!(
                !content.contains(token.as_str()),
                "{} still contains {}",
                file,
                token
            );
        }
    }

    let main = fs::read_to_string(dest.join("Big_Fuzz.d")).unwrap();
    assert!(main.contains("info.vendorName = \"Acme Audio\";"));
    assert!(main.contains("info.pluginUniqueID = \"AcBf\";"));
    assert!(main.contains("// com.acme.Big Fuzz"));

    let plugin: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dest.join("plugin.json")).unwrap()).unwrap();
    assert_eq!(plugin["vendorName"], "Acme Audio");
    assert_eq!(plugin["pluginName"], "Big Fuzz");
    assert_eq!(plugin["CFBundleIdentifierPrefix"], "com.acme");
    assert_eq!(plugin["isSynth"], false);
}

/// dub.json only has the plugin name swapped
#[test]
fn test_dub_json_only_plugin_name() {
    let f = fixture();
    Materializer::new(&f.template, &f.output)
        .materialize(&identity("Big Fuzz"))
        .unwrap();

    let dub = fs::read_to_string(f.output.join("Big_Fuzz/dub.json")).unwrap();
    assert_eq!(dub, DUB_JSON.replace("ExamplePlugin", "Big Fuzz"));
    assert!(dub.contains("Witty Audio"));
}

/// Other files are byte-identical copies
#[test]
fn test_other_files_untouched() {
    let f = fixture();
    Materializer::new(&f.template, &f.output)
        .materialize(&identity("Big Fuzz"))
        .unwrap();
    let dest = f.output.join("Big_Fuzz");

    for file in ["README.md", "gfx/knob.png", "fonts/VeraBd.ttf"] {
        assert_eq!(
            fs::read(dest.join(file)).unwrap(),
            fs::read(f.template.join(file)).unwrap(),
            "{} differs",
            file
        );
    }
}

/// A second run with the same name fails and leaves the first result alone
#[test]
fn test_second_run_fails() {
    let f = fixture();
    let m = Materializer::new(&f.template, &f.output);
    m.materialize(&identity("Big Fuzz")).unwrap();

    let main_path = f.output.join("Big_Fuzz/Big_Fuzz.d");
    let before = fs::read_to_string(&main_path).unwrap();

    let mut other = identity("Big Fuzz");
    other.vendor_name = "Someone Else".to_string();
    let err = m.materialize(&other).unwrap_err();

    assert!(matches!(
        err.downcast_ref::<MaterializeError>(),
        Some(MaterializeError::DestinationExists(_))
    ));
    assert_eq!(fs::read_to_string(&main_path).unwrap(), before);
}

#[test]
fn test_synth_and_midi_flags() {
    let f = fixture();
    let mut id = identity("Synthy");
    id.is_synth = true;
    id.receives_midi = true;
    Materializer::new(&f.template, &f.output)
        .materialize(&id)
        .unwrap();
    let dest = f.output.join("Synthy");

    let main = fs::read_to_string(dest.join("Synthy.d")).unwrap();
    assert!(main.contains("info.isSynth = true;"));
    assert!(main.contains("info.receivesMIDI = true;"));
    assert!(main.contains("info.hasGUI = false;"));

    let plugin: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dest.join("plugin.json")).unwrap()).unwrap();
    assert_eq!(plugin["isSynth"], true);
    assert_eq!(plugin["receivesMIDI"], true);
}

#[test]
fn test_quotes_in_input_keep_json_valid() {
    let f = fixture();
    let mut id = identity("Fuzz");
    id.vendor_name = "Acme \"Loud\" Audio".to_string();
    Materializer::new(&f.template, &f.output)
        .materialize(&id)
        .unwrap();

    let plugin: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(f.output.join("Fuzz/plugin.json")).unwrap())
            .unwrap();
    assert_eq!(plugin["vendorName"], "Acme \"Loud\" Audio");
}

#[test]
fn test_dry_run_writes_nothing() {
    let f = fixture();
    let plan = Materializer::new(&f.template, &f.output)
        .plan(&identity("Big Fuzz"))
        .unwrap();

    assert_eq!(plan.destination, f.output.join("Big_Fuzz"));
    assert_eq!(plan.main_target, "Big_Fuzz.d");
    assert!(!f.output.exists());
}

#[test]
fn test_configured_placeholders() {
    let tmp = TempDir::new().unwrap();
    let template = tmp.path().join("distort");
    fs::create_dir_all(&template).unwrap();
    fs::write(template.join("main.d"), "vendor = \"Auburn Sounds\"; name = \"Distort\";").unwrap();

    let config = Config::parse(
        r#"
main_source_prefix = "main"

[placeholders]
vendor_name = "Auburn Sounds"
plugin_name = "Distort"
"#,
    )
    .unwrap();

    let report = config
        .materializer(Some(&template), tmp.path())
        .materialize(&identity("Crunch"))
        .unwrap();

    assert_eq!(report.main_source, "Crunch.d");
    assert_eq!(
        fs::read_to_string(tmp.path().join("Crunch/Crunch.d")).unwrap(),
        "vendor = \"Acme Audio\"; name = \"Crunch\";"
    );
}
