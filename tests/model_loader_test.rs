use futures::executor::block_on;
use showroom::{
    data_structures::material::{MaterialRole, Shading, TextureSlot},
    data_structures::scene_graph::NodeKind,
    resources::model::load_model_gltf,
};

use crate::common::test_utils::{CORRUPT, MODEL_PATH, MemoryLoader, car_glb, car_gltf};

mod common;

fn loader() -> MemoryLoader {
    MemoryLoader::new().with_file(MODEL_PATH, car_glb())
}

#[test]
fn should_build_the_node_tree() {
    let model = block_on(load_model_gltf(&loader(), MODEL_PATH)).unwrap();

    assert_eq!(model.name, MODEL_PATH);
    assert_eq!(model.root.name, MODEL_PATH);
    assert_eq!(model.root.children.len(), 1);
    let car = &model.root.children[0];
    assert_eq!(car.name, "car");
    assert_eq!(car.kind, NodeKind::Group);
    let children: Vec<_> = car.children.iter().map(|n| n.name.as_str()).collect();
    assert_eq!(children, vec!["windows", "body", "decal", "bare"]);
    // root, car, windows, body, body_0, body_1, decal, bare
    assert_eq!(model.node_count(), 8);
    assert_eq!(model.meshes().len(), 5);
}

#[test]
fn should_split_multi_material_meshes_into_children() {
    let model = block_on(load_model_gltf(&loader(), MODEL_PATH)).unwrap();

    let body = model.find_node("body").unwrap();
    assert!(body.as_mesh().is_none());
    assert_eq!(body.children.len(), 2);
    assert_eq!(model.material_of("body_0").unwrap().name, "carbody");
    assert_eq!(model.material_of("body_1").unwrap().name, "chrome");
}

#[test]
fn should_read_geometry() {
    let model = block_on(load_model_gltf(&loader(), MODEL_PATH)).unwrap();

    let mesh = model.find_node("windows").unwrap().as_mesh().unwrap();
    assert_eq!(mesh.geometry.vertices.len(), 3);
    assert_eq!(mesh.geometry.indices, vec![0, 1, 2]);
    assert_eq!(mesh.geometry.vertices[1].position, [1.0, 0.0, 0.0]);

    let bounds = model.bounds().unwrap();
    assert_eq!(bounds.min, [0.0, 1.0, 0.0]);
    assert_eq!(bounds.max, [1.0, 2.0, 0.0]);
}

#[test]
fn should_resolve_material_roles_and_factors() {
    let model = block_on(load_model_gltf(&loader(), MODEL_PATH)).unwrap();

    let windows = model.material_of("windows").unwrap();
    assert_eq!(windows.role, MaterialRole::Windows);
    assert_eq!(windows.shading, Shading::PhysicallyBased);
    assert!((windows.metalness - 0.2).abs() < 1e-6);
    assert!((windows.roughness - 0.9).abs() < 1e-6);
    assert!(!windows.needs_update);

    let body = model.material_of("body_0").unwrap();
    assert_eq!(body.role, MaterialRole::CarBody);

    let chrome = model.material_named("chrome").unwrap();
    assert_eq!(chrome.role, MaterialRole::Other);
    assert!(chrome.transparent);
    assert_eq!(chrome.opacity, 0.25);

    let decal = model.material_of("decal").unwrap();
    assert_eq!(decal.shading, Shading::Unlit);
}

#[test]
fn should_add_a_default_material_for_primitives_without_one() {
    let model = block_on(load_model_gltf(&loader(), MODEL_PATH)).unwrap();

    assert_eq!(model.materials.len(), 5);
    let bare = model.material_of("bare").unwrap();
    assert_eq!(bare.name, "");
    assert_eq!(bare.role, MaterialRole::Other);
    assert!(bare.is_physically_based());
}

#[test]
fn should_decode_embedded_images_once_per_colour_space() {
    let loader = loader();
    let model = block_on(load_model_gltf(&loader, MODEL_PATH)).unwrap();

    let body = model.material_named("carbody").unwrap();
    let label = format!("{MODEL_PATH}#image0");
    assert_eq!(body.slots.get(TextureSlot::Color), Some(&label));
    assert_eq!(body.slots.get(TextureSlot::Normal), Some(&label));
    assert!(body.slots.get(TextureSlot::Height).is_none());
    // sRGB for the colour map, linear for the normal map
    assert_eq!(loader.decodes(), 2);
}

#[test]
fn should_load_external_buffers_relative_to_the_model() {
    let (json, bin) = car_gltf();
    let loader = MemoryLoader::new()
        .with_file("models/car/car.gltf", json.into_bytes())
        .with_file("models/car/car.bin", bin);

    let model = block_on(load_model_gltf(&loader, "models/car/car.gltf")).unwrap();

    assert!(loader.was_read("models/car/car.bin"));
    assert_eq!(model.meshes().len(), 5);
}

#[test]
fn should_fail_for_a_missing_file() {
    let loader = MemoryLoader::new();

    let err = block_on(load_model_gltf(&loader, MODEL_PATH)).unwrap_err();

    assert!(format!("{err:#}").contains(MODEL_PATH));
}

#[test]
fn should_fail_for_a_file_that_is_not_gltf() {
    let loader = MemoryLoader::new().with_file(MODEL_PATH, b"not a model".to_vec());

    let err = block_on(load_model_gltf(&loader, MODEL_PATH)).unwrap_err();

    assert!(err.to_string().contains("not a valid glTF"), "{err:#}");
}

#[test]
fn should_leave_slots_empty_when_an_image_does_not_decode() {
    let (json, bin) = car_gltf();
    let json = json.replace(
        r#""images": [{"bufferView": 2, "mimeType": "image/png"}]"#,
        r#""images": [{"uri": "paint.png"}]"#,
    );
    let loader = MemoryLoader::new()
        .with_file("models/car/car.gltf", json.into_bytes())
        .with_file("models/car/car.bin", bin)
        .with_file("models/car/paint.png", CORRUPT.to_vec());

    let model = block_on(load_model_gltf(&loader, "models/car/car.gltf")).unwrap();

    let body = model.material_named("carbody").unwrap();
    assert!(loader.was_read("models/car/paint.png"));
    assert!(body.slots.get(TextureSlot::Color).is_none());
    assert!(body.slots.get(TextureSlot::Normal).is_none());
    assert_eq!(model.meshes().len(), 5);
}
