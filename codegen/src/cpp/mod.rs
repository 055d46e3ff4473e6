//! C++ / pybind11 backend.
//!
//! Native functions are declared in `namespace oneflow::one::functional` and
//! forward to the runtime function library:
//!
//! ```cpp
//! Maybe<one::Tensor> Add(const std::shared_ptr<one::Tensor>& x, const std::shared_ptr<one::Tensor>& y) {
//!   static thread_local const auto& __op = CHECK_JUST((FunctionLibrary::Global()->find<...>("Add")));
//!   return __op->call(x, y);
//! }
//! ```
//!
//! Each overload gets a binding schema struct; an operator is registered as a
//! `PyFunction` over its schemas in dispatch order.

pub mod types;

use funcgen_schema::{ResolvedOperator, ResolvedOverload};

use crate::template::escape_braces;
use crate::types::{ArtifactKind, BindingFragment};
use crate::{Backend, Result};

use self::types::{cpp_default, cpp_param_type, cpp_parameter_names, cpp_return_type, cpp_string_literal, cpp_value_type};

pub const DEFAULT_LICENSE: &str = r#"/*
Copyright 2020 The OneFlow Authors. All rights reserved.

Licensed under the Apache License, Version 2.0 (the "License");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

    http://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an "AS IS" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.
*/"#;

const GENERATED_NOTICE: &str = "// Generated from {source}. DO NOT EDIT!";

const HEADER_TEMPLATE: &str = r#"#ifndef {guard}
#define {guard}

#include "oneflow/core/common/maybe.h"
#include "oneflow/core/common/optional.h"
#include "oneflow/core/common/scalar.h"
#include "oneflow/core/framework/dtype.h"
#include "oneflow/core/framework/tensor.h"
#include "oneflow/core/framework/tensor_tuple.h"

namespace oneflow {{
namespace one {{
namespace functional {{

{body}

}}  // namespace functional
}}  // namespace one
}}  // namespace oneflow

#endif  // {guard}
"#;

const SOURCE_TEMPLATE: &str = r#"#include "{header}"
#include "oneflow/core/functional/function_library.h"

namespace oneflow {{
namespace one {{
namespace functional {{

{body}

}}  // namespace functional
}}  // namespace one
}}  // namespace oneflow
"#;

const BINDING_HEADER_TEMPLATE: &str = r#"#include <pybind11/pybind11.h>

#include "oneflow/api/python/functional/function_def.h"
#include "{header}"

namespace py = pybind11;

namespace oneflow {{
namespace one {{
namespace functional {{

{body}

}}  // namespace functional
}}  // namespace one
}}  // namespace oneflow
"#;

const BINDING_SOURCE_TEMPLATE: &str = r#"#include <vector>
#include <pybind11/pybind11.h>

#include "oneflow/api/python/of_api_registry.h"
#include "oneflow/api/python/functional/function_def.h"
#include "oneflow/api/python/functional/py_function.h"
#include "{header}"
#include "{binding_header}"
#include "oneflow/core/common/maybe.h"
#include "oneflow/core/common/optional.h"

namespace py = pybind11;

namespace oneflow {{
namespace one {{
namespace functional {{

{body}

}}  // namespace functional
}}  // namespace one

namespace functional = one::functional;

ONEFLOW_API_PYBIND11_MODULE("_C", m) {{
  py::options options;
  options.disable_function_signatures();

{registrations}

  options.enable_function_signatures();
}}

}}  // namespace oneflow
"#;

/// C++ declarations and definitions plus pybind11 glue.
#[derive(Debug, Clone)]
pub struct CppBackend {
    header: String,
    source: String,
    binding_header: String,
    binding_source: String,
}

impl CppBackend {
    pub fn new() -> Self {
        Self::with_license(DEFAULT_LICENSE)
    }

    /// Backend whose artifacts start with `license` instead of the default
    /// Apache header. The text is copied verbatim.
    pub fn with_license(license: &str) -> Self {
        let preamble = format!("{}\n\n{GENERATED_NOTICE}\n\n", escape_braces(license.trim_end()));
        Self {
            header: format!("{preamble}{HEADER_TEMPLATE}"),
            source: format!("{preamble}{SOURCE_TEMPLATE}"),
            binding_header: format!("{preamble}{BINDING_HEADER_TEMPLATE}"),
            binding_source: format!("{preamble}{BINDING_SOURCE_TEMPLATE}"),
        }
    }
}

impl Default for CppBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl Backend for CppBackend {
    fn name(&self) -> &str {
        "cpp"
    }

    fn file_suffix(&self, kind: ArtifactKind) -> &str {
        match kind {
            ArtifactKind::Header => ".h",
            ArtifactKind::Source => ".cpp",
            ArtifactKind::BindingHeader => ".pybind.h",
            ArtifactKind::BindingSource => ".pybind.cpp",
        }
    }

    fn template(&self, kind: ArtifactKind) -> &str {
        match kind {
            ArtifactKind::Header => &self.header,
            ArtifactKind::Source => &self.source,
            ArtifactKind::BindingHeader => &self.binding_header,
            ArtifactKind::BindingSource => &self.binding_source,
        }
    }

    fn render_declaration(&self, overload: &ResolvedOverload) -> Result<String> {
        Ok(format!("{};", prototype(overload)))
    }

    fn render_definition(&self, overload: &ResolvedOverload) -> Result<String> {
        let args = cpp_parameter_names(overload.params());

        let mut code_lines: Vec<String> = Vec::new();
        code_lines.push(format!("{} {{", prototype(overload)));
        code_lines.push(format!(
            "  static thread_local const auto& __op = CHECK_JUST((FunctionLibrary::Global()->find<{}>({})));",
            function_type_args(overload),
            cpp_string_literal(overload.function()),
        ));
        code_lines.push(format!("  return __op->call({});", args.join(", ")));
        code_lines.push("}".to_string());
        Ok(code_lines.join("\n"))
    }

    fn render_binding(&self, op: &ResolvedOperator) -> Result<BindingFragment> {
        let ordered = op.by_precedence();

        let declaration: Vec<String> = ordered.iter().map(|o| schema_struct(o)).collect();
        let definition: Vec<String> = ordered.iter().map(|o| schema_definition(&op.name, o)).collect();
        let schemas: Vec<String> = ordered.iter().map(|o| format!("functional::{}", o.schema_id)).collect();

        Ok(BindingFragment {
            declaration: declaration.join("\n\n"),
            definition: definition.join("\n\n"),
            registration: format!(
                "  m.def({}, &functional::PyFunction<{}>);",
                cpp_string_literal(&op.name),
                schemas.join(", ")
            ),
        })
    }
}

/// `R Name(T0 a, T1 b)`
fn prototype(overload: &ResolvedOverload) -> String {
    let params: Vec<String> = overload
        .params()
        .iter()
        .zip(cpp_parameter_names(overload.params()))
        .map(|(p, name)| format!("{} {name}", cpp_param_type(&p.ty)))
        .collect();
    format!("{} {}({})", cpp_return_type(overload.return_type()), overload.function(), params.join(", "))
}

/// `R, T0, T1` as passed to `FunctionLibrary::find`.
fn function_type_args(overload: &ResolvedOverload) -> String {
    std::iter::once(cpp_return_type(overload.return_type()))
        .chain(overload.params().iter().map(|p| cpp_param_type(&p.ty)))
        .collect::<Vec<_>>()
        .join(", ")
}

fn schema_struct(overload: &ResolvedOverload) -> String {
    let param_types: Vec<String> = overload.params().iter().map(|p| cpp_param_type(&p.ty)).collect();
    let ret = cpp_return_type(overload.return_type());

    let mut code_lines: Vec<String> = Vec::new();
    code_lines.push(format!("struct {} {{", overload.schema_id));
    code_lines.push(format!("  using FType = {ret} ({});", param_types.join(", ")));
    code_lines.push(format!("  using R = {ret};"));
    code_lines.push(String::new());
    code_lines.push(format!("  static constexpr FType* func = &functional::{};", overload.function()));
    code_lines.push(format!("  static constexpr size_t max_args = {};", overload.params().len()));
    code_lines.push(format!("  static constexpr size_t max_pos_args = {};", overload.max_positional));
    code_lines.push(format!(
        "  static constexpr char const* signature = {};",
        cpp_string_literal(&overload.signature.python_signature())
    ));
    code_lines.push("  static FunctionDef function_def;".to_string());
    code_lines.push("};".to_string());
    code_lines.join("\n")
}

fn schema_definition(op: &str, overload: &ResolvedOverload) -> String {
    let id = &overload.schema_id;
    let arguments: Vec<String> = overload
        .params()
        .iter()
        .map(|p| {
            let value = match &p.default {
                Some(default) => format!("/*default_value*/{}", cpp_default(default, &p.ty)),
                None => format!("/*value_type*/ValueTypeOf<{}>()", cpp_value_type(&p.ty)),
            };
            format!(
                "ArgumentDef(/*name*/{}, {value}, /*size*/{}, /*keyword_only*/{}, /*optional*/{})",
                cpp_string_literal(&p.name),
                p.ty.list_size().unwrap_or(0),
                p.keyword_only,
                p.ty.is_optional(),
            )
        })
        .collect();

    let mut code_lines: Vec<String> = Vec::new();
    code_lines.push(format!("constexpr size_t {id}::max_args;"));
    code_lines.push(format!("constexpr size_t {id}::max_pos_args;"));
    code_lines.push(format!("constexpr char const* {id}::signature;"));
    code_lines.push(format!("FunctionDef {id}::function_def = {{"));
    code_lines.push(format!("/*name*/{},", cpp_string_literal(op)));
    code_lines.push(format!(
        "/*return_def*/ReturnDef(ValueTypeOf<{}>()),",
        cpp_return_type(overload.return_type())
    ));
    code_lines.push(format!("/*argument_def*/{{{}}}", arguments.join(", ")));
    code_lines.push("};".to_string());
    code_lines.join("\n")
}
