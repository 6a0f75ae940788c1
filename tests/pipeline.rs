// End-to-end tests over the full pipeline: a synthetic OAE CSV plus a real
// zipped shapefile on disk, loaded, filtered, and exported.

use std::collections::BTreeSet;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use shapefile::dbase::{FieldName, FieldValue, Record, TableWriterBuilder};
use tempfile::TempDir;

use oaemap::{FilterState, RouteCode, Session, StructureCode, apply, load_pair};

const OAE_HEADER: &str = " Latitude ,LONGITUDE,Cod Sgo,descr_obra,Tipo Obra,UF,BR,tipo_conflito,vl_codigo";

/// Five structures across MA and PI, per the reference scenario. Routes are
/// deliberately unpadded in the source to exercise normalization.
const OAE_ROWS: &[&str] = &[
    "-5.09,-42.80,123,PONTE RIO ITAPECURU,Ponte,MA,10,,10;20",
    "-5.20,-42.90,456,VIADUTO KM 45,Viaduto,MA,10,Duplicação,30",
    "-4.90,-43.10,789,PONTE RIO MUNIM,Ponte,MA,135,,40",
    "-6.10,-42.50,111,PONTE RIO POTI,Ponte,PI,10,,50",
    "-6.80,-43.00,222,PASSARELA CENTRO,Passarela,PI,343,Travessia urbana,",
];

/// Ten segments: six in MA (four on route 010), four in PI.
const SNV_ROWS: &[(&str, &str, &str, &str)] = &[
    ("10", "MA", "10", "Federal"),
    ("10", "MA", "20", "Federal"),
    ("10", "MA", "21", "Federal"),
    ("10", "MA", "22", "Federal"),
    ("135", "MA", "30", "Federal"),
    ("135", "MA", "31", "Estadual"),
    ("10", "PI", "50", "Federal"),
    ("10", "PI", "51", "Federal"),
    ("343", "PI", "60", "Federal"),
    ("343", "PI", "61", "Federal"),
];

fn write_oae_csv(dir: &Path, header: &str, rows: &[&str]) -> PathBuf {
    let path = dir.join("base_oae.csv");
    let mut content = String::from(header);
    for row in rows {
        content.push('\n');
        content.push_str(row);
    }
    fs::write(&path, content).unwrap();
    path
}

fn write_snv_zip(dir: &Path, rows: &[(&str, &str, &str, &str)]) -> PathBuf {
    let shp_dir = dir.join("snv_raw");
    fs::create_dir_all(&shp_dir).unwrap();

    let table = TableWriterBuilder::new()
        .add_character_field(FieldName::try_from("VL_BR").unwrap(), 10)
        .add_character_field(FieldName::try_from("SG_UF").unwrap(), 2)
        .add_character_field(FieldName::try_from("VL_CODIGO").unwrap(), 10)
        .add_character_field(FieldName::try_from("DS_TIPO_AD").unwrap(), 30);
    let shp_path = shp_dir.join("snv.shp");
    let mut writer = shapefile::Writer::from_path(&shp_path, table).unwrap();

    for (i, (vl_br, sg_uf, vl_codigo, ds_tipo_ad)) in rows.iter().enumerate() {
        let offset = i as f64 * 0.01;
        let shape = shapefile::Polyline::new(vec![
            shapefile::Point::new(-42.80 - offset, -5.00 - offset),
            shapefile::Point::new(-42.85 - offset, -5.05 - offset),
            shapefile::Point::new(-42.90 - offset, -5.10 - offset),
        ]);
        let mut record = Record::default();
        record.insert(
            "VL_BR".to_string(),
            FieldValue::Character(Some((*vl_br).to_string())),
        );
        record.insert(
            "SG_UF".to_string(),
            FieldValue::Character(Some((*sg_uf).to_string())),
        );
        record.insert(
            "VL_CODIGO".to_string(),
            FieldValue::Character(Some((*vl_codigo).to_string())),
        );
        record.insert(
            "DS_TIPO_AD".to_string(),
            FieldValue::Character(Some((*ds_tipo_ad).to_string())),
        );
        writer.write_shape_and_record(&shape, &record).unwrap();
    }
    drop(writer);

    // Real SNV archives ship a .prj sidecar; this one is SIRGAS 2000
    // geographic, which passes through coordinate-identical.
    fs::write(
        shp_dir.join("snv.prj"),
        r#"GEOGCS["SIRGAS 2000",DATUM["D_SIRGAS_2000",SPHEROID["GRS_1980",6378137.0,298.257222101]],PRIMEM["Greenwich",0.0],UNIT["Degree",0.0174532925199433]]"#,
    )
    .unwrap();

    zip_members(
        dir.join("snv.zip"),
        &[
            ("snv.shp", shp_dir.join("snv.shp")),
            ("snv.shx", shp_dir.join("snv.shx")),
            ("snv.dbf", shp_dir.join("snv.dbf")),
            ("snv.prj", shp_dir.join("snv.prj")),
        ],
    )
}

fn zip_members(zip_path: PathBuf, members: &[(&str, PathBuf)]) -> PathBuf {
    let file = File::create(&zip_path).unwrap();
    let mut zip = zip::ZipWriter::new(file);
    let options = zip::write::SimpleFileOptions::default();
    for (name, path) in members {
        zip.start_file(*name, options).unwrap();
        zip.write_all(&fs::read(path).unwrap()).unwrap();
    }
    zip.finish().unwrap();
    zip_path
}

fn fixture(dir: &Path) -> (PathBuf, PathBuf) {
    (
        write_oae_csv(dir, OAE_HEADER, OAE_ROWS),
        write_snv_zip(dir, SNV_ROWS),
    )
}

#[test]
fn normalization_unifies_crs_and_pads_codes() {
    let dir = TempDir::new().unwrap();
    let (oae, snv) = fixture(dir.path());
    let pair = load_pair(&oae, &snv).unwrap();

    assert_eq!(pair.crs, "EPSG:4326");
    assert_eq!(pair.structures.len(), 5);
    assert_eq!(pair.segments.len(), 10);

    for s in &pair.structures {
        assert_eq!(s.code.as_str().len(), 6, "code {}", s.code);
        assert_eq!(s.route.as_str().len(), 3, "route {}", s.route);
        assert!(s.streetview_link.starts_with("https://www.google.com/maps"));
    }
    for s in &pair.segments {
        assert_eq!(s.route.as_str().len(), 3);
        assert!(!s.geometry.0.is_empty());
    }

    let first = &pair.structures[0];
    assert_eq!(first.code.as_str(), "000123");
    assert_eq!(first.route.as_str(), "010");
    assert_eq!(first.link_codes, vec!["10", "20"]);
    assert!((first.lat() - -5.09).abs() < 1e-9);
}

#[test]
fn region_then_route_cascade_matches_reference_scenario() {
    let dir = TempDir::new().unwrap();
    let (oae, snv) = fixture(dir.path());
    let pair = load_pair(&oae, &snv).unwrap();

    let region_only = FilterState {
        regions: BTreeSet::from(["MA".to_string()]),
        ..Default::default()
    };
    let outcome = apply(&pair, &region_only);
    assert_eq!(outcome.structure_count(), 3);
    assert_eq!(outcome.segment_count(), 6);
    assert!(outcome.structures().all(|s| s.uf == "MA"));
    assert!(outcome.segments().all(|s| s.uf == "MA"));

    let region_and_route = FilterState {
        regions: BTreeSet::from(["MA".to_string()]),
        route: Some(RouteCode::parse("010")),
        ..Default::default()
    };
    let narrowed = apply(&pair, &region_and_route);
    assert_eq!(narrowed.structure_count(), 2);
    assert_eq!(narrowed.segment_count(), 4);
    assert!(narrowed.structures().all(|s| s.route.as_str() == "010"));
    assert!(narrowed.segments().all(|s| s.route.as_str() == "010"));

    // Deterministic across re-runs.
    let rerun = apply(&pair, &region_and_route);
    assert_eq!(rerun.structure_count(), narrowed.structure_count());
    assert_eq!(rerun.segment_count(), narrowed.segment_count());
    assert_eq!(rerun.options, narrowed.options);
}

#[test]
fn code_selection_follows_link_codes() {
    let dir = TempDir::new().unwrap();
    let (oae, snv) = fixture(dir.path());
    let pair = load_pair(&oae, &snv).unwrap();

    let state = FilterState {
        codes: BTreeSet::from([StructureCode::parse("123")]),
        ..Default::default()
    };
    let outcome = apply(&pair, &state);
    assert_eq!(outcome.structure_count(), 1);
    let links: BTreeSet<&str> = outcome
        .segments()
        .map(|s| s.link_code.as_deref().unwrap())
        .collect();
    assert_eq!(links, BTreeSet::from(["10", "20"]));
}

#[test]
fn option_domains_come_from_the_narrowed_subset() {
    let dir = TempDir::new().unwrap();
    let (oae, snv) = fixture(dir.path());
    let pair = load_pair(&oae, &snv).unwrap();

    let all = apply(&pair, &FilterState::default());
    assert_eq!(all.options.regions, vec!["MA", "PI"]);
    assert_eq!(all.options.routes, vec!["010", "135", "343"]);

    let pi_only = FilterState {
        regions: BTreeSet::from(["PI".to_string()]),
        ..Default::default()
    };
    let narrowed = apply(&pair, &pi_only);
    assert_eq!(narrowed.options.routes, vec!["010", "343"]);
    assert_eq!(narrowed.options.conflicts, vec!["Travessia urbana"]);
    for route in &narrowed.options.routes {
        assert!(all.options.routes.contains(route));
    }
}

#[test]
fn missing_latitude_column_is_terminal() {
    let dir = TempDir::new().unwrap();
    let oae = write_oae_csv(
        dir.path(),
        "LONGITUDE,Cod Sgo,descr_obra,Tipo Obra,UF,BR",
        &["-42.80,123,PONTE,Ponte,MA,10"],
    );
    let snv = write_snv_zip(dir.path(), SNV_ROWS);

    let err = load_pair(&oae, &snv).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("oae"), "message was: {message}");
    assert!(message.contains("latitude"), "message was: {message}");
}

#[test]
fn blank_coordinates_skip_the_row_but_garbage_is_terminal() {
    let dir = TempDir::new().unwrap();
    let snv = write_snv_zip(dir.path(), SNV_ROWS);

    let oae = write_oae_csv(
        dir.path(),
        OAE_HEADER,
        &[
            "-5.09,-42.80,123,PONTE RIO ITAPECURU,Ponte,MA,10,,10;20",
            ",-42.90,456,VIADUTO KM 45,Viaduto,MA,10,,30",
        ],
    );
    let pair = load_pair(&oae, &snv).unwrap();
    assert_eq!(pair.structures.len(), 1);
    assert_eq!(pair.structures[0].code.as_str(), "000123");

    let oae = write_oae_csv(
        dir.path(),
        OAE_HEADER,
        &["n/a,-42.80,123,PONTE RIO ITAPECURU,Ponte,MA,10,,"],
    );
    let err = load_pair(&oae, &snv).unwrap_err();
    assert!(err.to_string().contains("latitude"), "message was: {err}");
}

#[test]
fn archive_without_shp_layer_is_terminal() {
    let dir = TempDir::new().unwrap();
    let (oae, good_zip) = fixture(dir.path());

    // Rebuild the archive with the .shp member left out.
    let _ = good_zip;
    let readme = dir.path().join("leia-me.txt");
    fs::write(&readme, "sem camada").unwrap();
    let bad_zip = zip_members(dir.path().join("bad.zip"), &[("leia-me.txt", readme)]);

    let err = load_pair(&oae, &bad_zip).unwrap_err();
    assert!(err.to_string().contains(".shp"), "message was: {err}");
}

#[test]
fn session_reuses_byte_identical_uploads() {
    let dir = TempDir::new().unwrap();
    let (oae, snv) = fixture(dir.path());

    let mut session = Session::new();
    let first = session.load(&oae, &snv).unwrap();
    let second = session.load(&oae, &snv).unwrap();
    assert!(std::sync::Arc::ptr_eq(&first, &second));

    // Changing the upload bytes invalidates the cache.
    let mut rows = OAE_ROWS.to_vec();
    rows.pop();
    write_oae_csv(dir.path(), OAE_HEADER, &rows);
    let third = session.load(&oae, &snv).unwrap();
    assert!(!std::sync::Arc::ptr_eq(&first, &third));
    assert_eq!(third.structures.len(), 4);
}

#[test]
fn geojson_export_carries_tooltip_columns_and_crs() {
    let dir = TempDir::new().unwrap();
    let (oae, snv) = fixture(dir.path());
    let pair = load_pair(&oae, &snv).unwrap();
    let outcome = apply(&pair, &FilterState::default());

    let segments = oaemap::segments_to_geojson(&outcome);
    assert_eq!(segments["type"], "FeatureCollection");
    assert_eq!(segments["crs"]["properties"]["name"], "EPSG:4326");
    let feature = &segments["features"][0];
    assert_eq!(feature["geometry"]["type"], "MultiLineString");
    assert_eq!(feature["properties"]["vl_br"], "010");
    assert_eq!(feature["properties"]["sg_uf"], "MA");

    let structures = oaemap::structures_to_geojson(&outcome);
    assert_eq!(
        structures["features"].as_array().unwrap().len(),
        outcome.structure_count()
    );
    let feature = &structures["features"][0];
    assert_eq!(feature["geometry"]["type"], "Point");
    assert_eq!(feature["properties"]["cod_sgo"], "000123");
    assert_eq!(feature["properties"]["br"], "010");
    assert!(
        feature["properties"]["streetview_link"]
            .as_str()
            .unwrap()
            .contains("cbll=")
    );
}
