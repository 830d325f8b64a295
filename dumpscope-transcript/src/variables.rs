//! ローカル変数出力（`dv /t`）の解析

use crate::parse::{parse_signed_decimal, SIGNED_DECIMAL_PREFIX};
use crate::{Variable, VariableValue};
use tracing::trace;

/// 型名・変数名と値の区切り
const ASSIGNMENT: &str = " = ";

/// `<型> <名前> = <値>` 形式の1行をパースする
///
/// ` = ` を含まない行や、左辺が空の行は None を返します。
///
/// # Examples
/// ```
/// use dumpscope_transcript::{parse_variable_line, Variable};
///
/// assert_eq!(
///     parse_variable_line("char ** argv = 0x032053f0"),
///     Some(Variable::new("char **", "argv", "0x032053f0"))
/// );
/// ```
pub fn parse_variable_line(line: &str) -> Option<Variable> {
    let (left, right) = line.split_once(ASSIGNMENT)?;

    let mut tokens: Vec<&str> = left.split_whitespace().collect();
    let name = tokens.pop()?;
    let type_name = tokens.join(" ");

    let value = if right.starts_with(SIGNED_DECIMAL_PREFIX) {
        match parse_signed_decimal(right) {
            Some(i) => VariableValue::Integer(i),
            None => {
                trace!(value = right, "0n value is not a plain integer");
                VariableValue::Text(right.to_string())
            }
        }
    } else {
        VariableValue::Text(right.to_string())
    };

    Some(Variable {
        type_name,
        name: name.to_string(),
        value,
    })
}

/// 変数一覧の出力全体をパースする
///
/// 変数行以外（空行、マーカー、フレーム行など）は無視されます。
/// 出力順は保持されます。
pub fn parse_variables(output: &str) -> Vec<Variable> {
    output.lines().filter_map(parse_variable_line).collect()
}
