pub mod dialect;

use std::collections::HashMap;

use tera::{Context, Tera, Value};

use crate::domain::error::TemplateError;
use crate::domain::model::RoleMetadata;

use dialect::{LEFT_DELIM, PRINT_FILTER};

const TEMPLATE_NAME: &str = "role";

/// ロールのメタデータをコンテキストとして `<<` `>>` テンプレートを描画する。
///
/// テンプレートは [`dialect::translate`] で Tera の構文に変換してから
/// 自動エスケープなしで描画する。
pub struct RoleRenderer {
    context: Context,
}

impl RoleRenderer {
    /// メタデータからレンダリングコンテキストを構築する。
    ///
    /// # Errors
    /// メタデータをコンテキストに変換できない場合。
    pub fn new(metadata: &RoleMetadata) -> Result<Self, TemplateError> {
        let context = Context::from_serialize(metadata)
            .map_err(|e| TemplateError::Render(describe(&e)))?;
        Ok(Self { context })
    }

    /// テンプレート文字列を描画する。アクションを含まない入力はそのまま返す。
    ///
    /// # Errors
    /// テンプレートの解析、または描画に失敗した場合。
    pub fn render(&self, source: &str) -> Result<String, TemplateError> {
        if !source.contains(LEFT_DELIM) {
            return Ok(source.to_string());
        }
        let translated = dialect::translate(source)?;

        let mut tera = Tera::default();
        tera.autoescape_on(Vec::new());
        tera.register_filter(PRINT_FILTER, print_filter);
        tera.add_raw_template(TEMPLATE_NAME, &translated)
            .map_err(|e| TemplateError::Render(describe(&e)))?;
        tera.render(TEMPLATE_NAME, &self.context)
            .map_err(|e| TemplateError::Render(describe(&e)))
    }
}

fn print_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    Ok(Value::String(format_value(value)))
}

/// 出力用の文字列表現。リストは `[a b]`、マップは `map[k:v]` の形にする。
pub fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "<no value>".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => {
            let items: Vec<String> = items.iter().map(format_value).collect();
            format!("[{}]", items.join(" "))
        }
        Value::Object(map) => {
            let mut entries: Vec<String> = map
                .iter()
                .map(|(k, v)| format!("{k}:{}", format_value(v)))
                .collect();
            entries.sort();
            format!("map[{}]", entries.join(" "))
        }
    }
}

/// Tera のエラーは原因側に詳細があるため、原因の連鎖を連結して返す。
fn describe(err: &tera::Error) -> String {
    let mut messages = Vec::new();
    let mut source = std::error::Error::source(err);
    while let Some(inner) = source {
        messages.push(inner.to_string());
        source = inner.source();
    }
    if messages.is_empty() {
        err.to_string()
    } else {
        messages.join(": ")
    }
}
