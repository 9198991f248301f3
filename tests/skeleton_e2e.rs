//! End-to-end scenarios S1-S6 (§8) driven through the TypeScript adapter,
//! plus a sampling of the numbered invariants, exercised through the public
//! harness/analyzer surface against on-disk fixtures.

use std::fs;

use skelter::config::HarnessOptions;
use skelter::harness::analyze_project;
use tempfile::TempDir;

fn analyze_one_file(name: &str, source: &str) -> skelter::analyzer::Analyzer {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join(name), source).unwrap();
    let options = HarnessOptions::new(tmp.path());
    analyze_project(options).unwrap()
}

#[test]
fn s1_exported_class_with_method() {
    let source = "export class Point { x: number; constructor(x: number) { this.x = x; } distance(p: Point): number { return 0; } }\n";
    let analyzer = analyze_one_file("point.ts", source);
    let class = analyzer
        .get_all_declarations()
        .into_iter()
        .find(|u| &*u.short_name == "Point")
        .expect("Point class unit");
    let skeleton = analyzer.get_skeleton(&class.fq_name()).unwrap();
    assert_eq!(
        skeleton,
        "export class Point {\n  x: number\n  constructor(x: number) { ... }\n  distance(p: Point): number { ... }\n}"
    );
}

#[test]
fn s2_interface_in_namespace() {
    let source = "namespace Geom { export interface Shape { area(): number; name: string; } }\n";
    let analyzer = analyze_one_file("geom.ts", source);
    let ns = analyzer
        .get_all_declarations()
        .into_iter()
        .find(|u| &*u.short_name == "Geom")
        .expect("Geom namespace unit");
    let skeleton = analyzer.get_skeleton(&ns.fq_name()).unwrap();
    assert!(skeleton.contains("interface Shape {"));
    assert!(!skeleton.contains("function"));
    assert!(!skeleton.contains("area(): number;"));
}

#[test]
fn s3_exported_arrow_function_no_duplicate() {
    let source = "export const add = (a: number, b: number): number => a + b;\n";
    let analyzer = analyze_one_file("math.ts", source);
    let skeletons = analyzer.get_skeletons("math.ts");
    assert_eq!(skeletons.len(), 1);
    assert_eq!(skeletons[0].1, "export const add = (a: number, b: number): number => { ... }");
    assert!(!analyzer
        .search_definitions("_module_.add")
        .iter()
        .any(|u| u.file.as_ref() == "math.ts"));
}

#[test]
fn s4_enum_no_trailing_comma() {
    let source = "enum Color { Red = 1, Green, Blue }\n";
    let analyzer = analyze_one_file("color.ts", source);
    let skeletons = analyzer.get_skeletons("color.ts");
    assert_eq!(skeletons.len(), 1);
    assert_eq!(skeletons[0].1, "enum Color {\n  Red = 1,\n  Green,\n  Blue\n}");
}

#[test]
fn s5_construct_signature_inside_interface() {
    let source = "interface Ctor<T> { new (x: T): Array<T>; }\n";
    let analyzer = analyze_one_file("ctor.ts", source);
    let skeleton = &analyzer.get_skeletons("ctor.ts")[0].1;
    assert!(skeleton.contains("new (x: T): Array<T>"));
    assert!(!skeleton.contains("new (x: T): Array<T>;"));
    assert!(!skeleton.contains("function"));
}

#[test]
fn s6_ambient_module_with_function_signature() {
    let source = "declare namespace N { function f(x: number): void; }\n";
    let analyzer = analyze_one_file("ambient.ts", source);
    let skeleton = &analyzer.get_skeletons("ambient.ts")[0].1;
    assert!(skeleton.lines().any(|l| l.trim() == "f(x: number): void"));
}

#[test]
fn invariant_skeletons_subset_of_top_level() {
    let source = "export class Box<T> { value: T; get(): T { return this.value; } }\n";
    let analyzer = analyze_one_file("box.ts", source);
    let skeletons = analyzer.get_skeletons("box.ts");
    let all_in_file = analyzer.get_declarations_in_file("box.ts");
    for (unit, _) in &skeletons {
        assert!(all_in_file.contains(unit));
    }
}

#[test]
fn invariant_class_like_skeleton_starts_and_ends_correctly() {
    let source = "export class Counter { count: number = 0; }\n";
    let analyzer = analyze_one_file("counter.ts", source);
    let class = analyzer.get_all_declarations().into_iter().next().unwrap();
    let skeleton = analyzer.get_skeleton(&class.fq_name()).unwrap();
    assert!(skeleton.lines().next().unwrap().ends_with('{'));
    assert_eq!(skeleton.lines().last().unwrap(), "}");
}

#[test]
fn harness_respects_exclude_list() {
    let tmp = TempDir::new().unwrap();
    let vendored = tmp.path().join("vendored");
    fs::create_dir_all(&vendored).unwrap();
    fs::write(vendored.join("dep.ts"), "export class Vendored {}\n").unwrap();
    fs::write(tmp.path().join("app.ts"), "export class App {}\n").unwrap();

    let options = HarnessOptions::new(tmp.path()).with_exclude([std::path::PathBuf::from("vendored")]);
    let analyzer = analyze_project(options).unwrap();

    let names: Vec<String> = analyzer.get_all_declarations().iter().map(|u| u.short_name.to_string()).collect();
    assert!(names.contains(&"App".to_string()));
    assert!(!names.contains(&"Vendored".to_string()));
}

#[test]
fn empty_project_is_empty() {
    let tmp = TempDir::new().unwrap();
    let analyzer = analyze_project(HarnessOptions::new(tmp.path())).unwrap();
    assert!(analyzer.is_empty());
}
