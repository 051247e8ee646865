//! Flow projection of bundled declarations
//!
//! Parses the bundle with [`crate::syntax`] and prints Flow library
//! definitions. Parse failures become [`ProjectionError`]s positioned in the
//! bundle, which is what the operator needs to find the offending construct.

mod printer;

use std::path::Path;

use tracing::debug;

use crate::domain::ports::TypeProjector;
use crate::error::ProjectionError;
use crate::syntax::parse;

pub const DEFAULT_EXTENSION: &str = "js.flow";

#[derive(Debug, Clone)]
pub struct FlowProjector {
    extension: String,
}

impl FlowProjector {
    pub fn new() -> Self {
        Self {
            extension: DEFAULT_EXTENSION.to_string(),
        }
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }
}

impl Default for FlowProjector {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeProjector for FlowProjector {
    fn project(&self, source: &str, origin: &Path) -> Result<String, ProjectionError> {
        let file = parse(source).map_err(|err| ProjectionError {
            path: origin.to_path_buf(),
            line: err.line,
            column: err.column,
            message: err.message,
        })?;
        debug!(
            origin = %origin.display(),
            items = file.items.len(),
            "projecting declarations"
        );
        Ok(printer::print_file(&file, &origin_stem(origin)))
    }

    fn extension(&self) -> &str {
        &self.extension
    }
}

/// `acme-widgets` for `/tmp/tsflow-x/acme-widgets.d.ts`
fn origin_stem(origin: &Path) -> String {
    let name = origin
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    name.strip_suffix(".d.ts")
        .map(str::to_string)
        .unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;

    const HEADER_END: &str = " * @flow\n */\n\n";

    fn project(source: &str) -> String {
        let output = FlowProjector::new()
            .project(source, Path::new("/tmp/ws/widgets.d.ts"))
            .unwrap();
        let start = output.find(HEADER_END).unwrap() + HEADER_END.len();
        output[start..].trim_end().to_string()
    }

    #[test]
    fn test_header_names_package_and_is_stable() {
        let projector = FlowProjector::new();
        let source = "declare module \"widgets\" {\n  export type A = string;\n}\n";
        let first = projector
            .project(source, Path::new("/tmp/a/acme-widgets.d.ts"))
            .unwrap();
        let second = projector
            .project(source, Path::new("/tmp/b/acme-widgets.d.ts"))
            .unwrap();

        assert_eq!(first, second);
        assert!(first.starts_with(
            "/**\n * Flow type definitions for acme-widgets\n * Generated by tsflow from TypeScript declarations. Do not edit by hand.\n *\n * @flow\n */\n"
        ));
        assert!(first.ends_with("}\n"));
    }

    #[test]
    fn test_parse_error_is_positioned() {
        let err = FlowProjector::new()
            .project("export type = string;\n", Path::new("widgets.d.ts"))
            .unwrap_err();

        assert_eq!(err.path, Path::new("widgets.d.ts"));
        assert_eq!(err.line, 1);
        assert_eq!(err.column, 8);
    }

    #[test]
    fn test_extension_is_configurable() {
        assert_eq!(FlowProjector::new().extension(), "js.flow");
        assert_eq!(FlowProjector::new().with_extension("flow").extension(), "flow");
    }

    #[test]
    fn test_module_declarations() {
        let output = project(
            r#"declare module "widgets" {
  import { Size } from "widgets/types";
  /**
   * Measure things.
   */
  export function measure(input: string | undefined, ...rest: number[]): Size;
  export interface Options {
    readonly name: string;
    size?: Size;
    [key: string]: unknown;
  }
  export type Mode = "a" | "b";
  export const VERSION = "1.0";
}
"#,
        );

        assert_snapshot!(output, @r#"
        declare module "widgets" {
          import type { Size } from "widgets/types";

          /**
           * Measure things.
           */
          declare export function measure(input: string | void, ...rest: number[]): Size;

          declare export interface Options {
            +name: string;
            size?: Size;
            [key: string]: mixed;
          }

          declare export type Mode = "a" | "b";
          declare export const VERSION: "1.0";
        }
        "#);
    }

    #[test]
    fn test_enums_namespaces_and_classes() {
        let output = project(
            r#"declare module "shapes" {
  export enum Color {
    Red,
    Green = 5,
    Blue
  }
  export namespace Geometry {
    interface Point {
      x: number;
    }
    function distance(a: Point, b: Point): number;
  }
  export class Circle extends Base implements Shape {
    private secret;
    protected radius: number;
    static readonly unit: Geometry.Point;
    constructor(radius: number);
    get area(): number;
    set label(value: string);
    [Symbol.iterator](): Iterator<number>;
  }
}
"#,
        );

        assert_snapshot!(output, @r#"
        declare module "shapes" {
          declare export var Color: {| +Red: 0, +Green: 5, +Blue: 6 |};

          declare export interface Geometry$Point {
            x: number;
          }

          declare export function Geometry$distance(a: Geometry$Point, b: Geometry$Point): number;

          declare export var Geometry: {
            distance: typeof Geometry$distance,
          };

          declare export class Circle extends Base implements Shape {
            radius: number;
            static +unit: Geometry$Point;
            constructor(radius: number): void;
            +area: number;
            -label: string;
            @@iterator(): Iterator<number>;
          }
        }
        "#);
    }

    #[test]
    fn test_type_mappings() {
        let output = project(
            r#"export type A<T> = {
  readonly [K in keyof T]?: T[K];
};
export type B = ReadonlyArray<string> | readonly number[];
export type C = Partial<Props> & Record<string, number>;
export type D = Omit<Props, "a"> | NonNullable<X>;
export type E = import("./dep").Thing;
export type F = new (x: number) => Widget;
export type G = [first: string, second?: number] | [string, number?];
export type H = `prefix-${string}`;
export type I<T> = T extends Array<infer U> ? U : never;
export type J = { a: string; b(): void } | {};
export type K = unique symbol | object | symbol | bigint;
export declare function isWidget(x: unknown): x is Widget;
"#,
        );

        assert_snapshot!(output, @r#"
        declare export type A<T> = { +[K in keyof T]?: T[K] };
        declare export type B = $ReadOnlyArray<string> | $ReadOnlyArray<number>;
        declare export type C = $Rest<Props, {...}> & { [key: string]: number, ... };
        declare export type D = $Diff<Props, { [key: "a"]: mixed, ... }> | $NonMaybeType<X>;
        declare export type E = $PropertyType<$Exports<"./dep">, "Thing">;
        declare export type F = Class<Widget>;
        declare export type G = [first: string, second?: number] | [string, number | void];
        declare export type H = string;
        declare export type I<T> = T extends Array<infer U> ? U : empty;
        declare export type J = { a: string, b(): void, ... } | {...};
        declare export type K = Symbol | {...} | Symbol | bigint;
        declare export function isWidget(x: mixed): boolean;
        "#);
    }

    #[test]
    fn test_imports_and_exports() {
        let output = project(
            r#"declare module "lib" {
  import * as ns from "other";
  import Thing, { Helper as H } from "thing";
  import "polyfill";
  import fs = require("fs");
  interface Config {
    debug: boolean;
  }
  declare class Client {}
  export { Config };
  export * from "lib/util";
  export * as extra from "lib/extra";
  export default Client;
  export as namespace Lib;
  declare global {
    interface Window {
      lib: Client;
    }
  }
}
declare module "lib/cfg" {
  interface Config {
    debug: boolean;
  }
  export = Config;
}
declare module "lib/empty" {
  export {};
}
"#,
        );

        assert_snapshot!(output, @r#"
        declare module "lib" {
          import * as ns from "other";
          import type Thing, { Helper as H } from "thing";
          import * as fs from "fs";

          declare interface Config {
            debug: boolean;
          }

          declare class Client {}
          declare export { Config };
          declare export * from "lib/util";
          declare export * as extra from "lib/extra";
          declare export default typeof Client;
          // tsflow: declare global block omitted
        }

        declare module "lib/cfg" {
          declare interface Config {
            debug: boolean;
          }

          declare module.exports: Config;
        }

        declare module "lib/empty" {}
        "#);
    }

    #[test]
    fn test_module_without_exports_exports_everything() {
        let output = project(
            r#"declare module "legacy" {
  function helper(): void;
  const x: number;
  let count = 3;
}
"#,
        );

        assert_snapshot!(output, @r#"
        declare module "legacy" {
          declare export function helper(): void;
          declare export const x: number;
          declare export let count: number;
        }
        "#);
    }

    #[test]
    fn test_import_alias_of_type_and_construct_signature() {
        let output = project(
            r#"export namespace N {
  interface Y {
    a: string;
  }
  const z: number;
}
export import A = N.Y;
export import B = N.z;
export interface Ctor {
  new (x: number): Ctor;
  name: string;
}
"#,
        );

        assert!(output.contains("declare export type A = N$Y;\n"), "{}", output);
        assert!(output.contains("declare export var B: typeof N$z;\n"), "{}", output);
        assert!(
            output.contains(
                "declare export interface Ctor {\n  // tsflow: construct signature omitted\n  name: string;\n}"
            ),
            "{}",
            output
        );
        assert!(!output.contains("typeof N$Y"));
    }

    #[test]
    fn test_origin_stem() {
        assert_eq!(origin_stem(Path::new("/tmp/ws/acme-widgets.d.ts")), "acme-widgets");
        assert_eq!(origin_stem(Path::new("plain.txt")), "plain.txt");
    }
}
