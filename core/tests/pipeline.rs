use apidoc_core::{App, Configuration, ErrorKind, HttpMethod, OUTPUT_FILE};
use pretty_assertions::assert_eq;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

const MAIN: &str = r#"package main

// @title Pet Store
// @version 2.0.0
// @description Pets and their owners.
// @server https://pets.example.com
func main() {}
"#;

const ROUTERS: &str = r#"package routes

// @router api /api
type Api struct{}

// @router v1 /v1
// @mount api
type V1 struct{}

// @router v2 /v2
// @mount api
type V2 struct{}

// @router users /users
// @mount v1
// @mount v2
type Users struct{}
"#;

const MODELS: &str = r#"package models

// @component User
// @description A registered user.
// @property id integer(int64) required
// @property name string required "Display name"
// @property pets []Pet
type User struct{}

// @component Pet
// @property name string required
// @property labels map[string]
type Pet struct{}
"#;

const USERS: &str = r#"package handlers

// @endpoint GET /
// @group users
// @summary List users
// @tag users
// @param limit query integer
// @response 200 []User "Every user"
func ListUsers() {}

// @endpoint POST /
// @group users
// @request User
// @response 201 User
// @response 400 "Bad input"
func CreateUser() {}

// @endpoint GET /{id}
// @group users
// @param id path integer(int64)
// @response 200 User
// @response 404 "No such user"
func GetUser() {}

// @endpoint DELETE /{id}
// @group users
// @exclude
func DeleteUser() {}

// @endpoint /health
func Health() {}
"#;

const OVERRIDE: &str = r#"package handlers

// @endpoint GET /
// @group users
// @summary List users (v1 only)
// @operation listUsersV1
// @response 200 []User
func ListUsersOverride() {}
"#;

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn fixture(root: &Path) {
    write(root, "main.go", MAIN);
    write(root, "routes/routes.go", ROUTERS);
    write(root, "models/models.go", MODELS);
    write(root, "handlers/users.go", USERS);
}

fn config(root: &Path, output: &Path) -> Configuration {
    Configuration {
        source_dir: root.to_path_buf(),
        main_file: PathBuf::from("main.go"),
        endpoints_root: PathBuf::from("handlers"),
        output_dir: output.to_path_buf(),
        verbose: true,
    }
}

fn routes(config: Configuration) -> Vec<String> {
    App::new(config)
        .check()
        .unwrap()
        .endpoints
        .iter()
        .map(|e| format!("{} {}", e.method.map(|m| m.as_str()).unwrap_or("?"), e.path))
        .collect()
}

#[test]
fn test_generates_document_with_fan_out() {
    let src = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    fixture(src.path());
    let output_dir = out.path().join("docs");

    let written = App::new(config(src.path(), &output_dir)).start().unwrap();
    assert_eq!(written, output_dir.join(OUTPUT_FILE));

    let yaml = fs::read_to_string(&written).unwrap();
    let doc: Value = serde_yaml::from_str(&yaml).unwrap();

    assert_eq!(doc["openapi"], Value::from("3.1.0"));
    assert_eq!(doc["info"]["title"], Value::from("Pet Store"));
    assert_eq!(doc["servers"][0]["url"], Value::from("https://pets.example.com"));

    let paths: Vec<&str> = doc["paths"]
        .as_object()
        .unwrap()
        .keys()
        .map(String::as_str)
        .collect();
    assert_eq!(
        paths,
        vec![
            "/api/v1/users",
            "/api/v1/users/{id}",
            "/api/v2/users",
            "/api/v2/users/{id}",
        ]
    );

    let v1 = &doc["paths"]["/api/v1/users"];
    assert_eq!(
        v1["get"]["responses"]["200"]["content"]["application/json"]["schema"]["items"]["$ref"],
        Value::from("#/components/schemas/User")
    );
    assert_eq!(
        v1["post"]["requestBody"]["content"]["application/json"]["schema"]["$ref"],
        Value::from("#/components/schemas/User")
    );
    assert_eq!(
        doc["paths"]["/api/v2/users/{id}"]["get"]["parameters"][0]["required"],
        Value::Bool(true)
    );
    assert!(doc["paths"]["/api/v1/users/{id}"].get("delete").is_none());
    assert!(doc["paths"].get("/health").is_none());

    let schemas: Vec<&str> = doc["components"]["schemas"]
        .as_object()
        .unwrap()
        .keys()
        .map(String::as_str)
        .collect();
    assert_eq!(schemas, vec!["Pet", "User"]);
}

#[test]
fn test_second_run_is_byte_identical() {
    let src = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    fixture(src.path());

    let app = App::new(config(src.path(), out.path()));
    let first = fs::read(app.start().unwrap()).unwrap();
    let second = fs::read(app.start().unwrap()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_later_declaration_overrides() {
    let src = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    fixture(src.path());
    write(src.path(), "handlers/zz_override.go", OVERRIDE);

    let document = App::new(config(src.path(), out.path())).check().unwrap();
    let list: Vec<_> = document
        .endpoints
        .iter()
        .filter(|e| e.method == Some(HttpMethod::Get) && e.path.ends_with("/users"))
        .collect();

    assert_eq!(list.len(), 2);
    for endpoint in list {
        assert_eq!(endpoint.summary.as_deref(), Some("List users (v1 only)"));
        assert_eq!(
            endpoint.location.file,
            PathBuf::from("handlers").join("zz_override.go")
        );
    }
}

#[test]
fn test_component_bodies_are_bound_after_resolution() {
    let src = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    fixture(src.path());

    let document = App::new(config(src.path(), out.path())).check().unwrap();
    let get_user = document
        .endpoints
        .iter()
        .find(|e| e.method == Some(HttpMethod::Get) && e.path == "/api/v1/users/{id}")
        .unwrap();
    let schema = get_user.responses[0].schema.as_ref().unwrap();

    let user = schema.references()[0].bound().unwrap();
    assert_eq!(user.name, "User");
    let pet = user.schema.references()[0].bound().unwrap();
    assert_eq!(pet.name, "Pet");
    assert!(!schema.has_unresolved());
}

#[test]
fn test_reference_cycle_aborts_without_output() {
    let src = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    fixture(src.path());
    write(
        src.path(),
        "models/cycle.go",
        r#"// @component Node
// @property next Edge
// @component Edge
// @property target Node
type Node struct{}
"#,
    );
    write(
        src.path(),
        "handlers/graph.go",
        "// @endpoint GET /graph\n// @response 200 Node\nfunc Graph() {}\n",
    );

    let output_dir = out.path().join("docs");
    let err = App::new(config(src.path(), &output_dir)).start().unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ReferenceCycle);
    assert!(!output_dir.join(OUTPUT_FILE).exists());
}

#[test]
fn test_unresolved_reference_aborts_instead_of_dropping() {
    let src = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    fixture(src.path());
    write(
        src.path(),
        "handlers/ghost.go",
        "// @endpoint GET /ghost\n// @response 200 Ghost\nfunc Ghost() {}\n",
    );

    let err = App::new(config(src.path(), out.path())).start().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnresolvedReference);
    assert!(err.to_string().contains("'Ghost'"));
    assert!(!out.path().join(OUTPUT_FILE).exists());
}

#[test]
fn test_failed_run_keeps_previous_document() {
    let src = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    fixture(src.path());
    let app = App::new(config(src.path(), out.path()));
    let before = fs::read(app.start().unwrap()).unwrap();

    write(
        src.path(),
        "handlers/orphan.go",
        "// @endpoint GET /x\n// @group nowhere\nfunc X() {}\n",
    );
    let err = App::new(config(src.path(), out.path())).start().unwrap_err();

    assert_eq!(err.kind(), ErrorKind::DanglingRouter);
    assert_eq!(fs::read(out.path().join(OUTPUT_FILE)).unwrap(), before);
}

#[test]
fn test_router_cycle_aborts() {
    let src = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    fixture(src.path());
    write(
        src.path(),
        "routes/loop.go",
        "// @router a /a\n// @mount b\n// @router b /b\n// @mount a\ntype Loop struct{}\n",
    );

    let err = App::new(config(src.path(), out.path())).check().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::RouterCycle);
}

#[test]
fn test_endpoints_root_limits_endpoints() {
    let src = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    fixture(src.path());
    write(
        src.path(),
        "scripts/tool.py",
        "# @endpoint GET /internal\ndef tool(): pass\n",
    );

    let scoped = routes(config(src.path(), out.path()));
    assert!(!scoped.contains(&"GET /internal".to_string()));

    let mut everything = config(src.path(), out.path());
    everything.endpoints_root = PathBuf::from(".");
    assert!(routes(everything).contains(&"GET /internal".to_string()));
}
