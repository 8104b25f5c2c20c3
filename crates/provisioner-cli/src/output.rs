use provisioner_core::invocation::Invocation;
use serde::Serialize;

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

/// Render planned invocations as a two-column table.
pub fn print_plan(invocations: &[Invocation]) {
    println!("{}", render_plan(invocations));
}

pub fn render_plan(invocations: &[Invocation]) -> String {
    const HEADERS: [&str; 2] = ["STAGE", "COMMAND"];
    let width = invocations
        .iter()
        .map(|i| i.stage.as_str().len())
        .chain(std::iter::once(HEADERS[0].len()))
        .max()
        .unwrap_or(0);

    let mut lines = vec![
        format!("{:width$}  {}", HEADERS[0], HEADERS[1]),
        format!("{}  {}", "-".repeat(width), "-".repeat(HEADERS[1].len())),
    ];
    for inv in invocations {
        lines.push(format!("{:width$}  {}", inv.stage.as_str(), inv.command_line()));
    }
    if let Some(first) = invocations.first() {
        lines.push(String::new());
        lines.push(format!("working directory: {}", first.cwd.display()));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use provisioner_core::invocation::Stage;

    #[test]
    fn plan_table_aligns_commands() {
        let plan = vec![
            Invocation::new(Stage::Login, "pulumi", "/srv").arg("login"),
            Invocation::new(Stage::GenerateModel, "./build-model.py", "/srv"),
        ];
        let out = render_plan(&plan);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "STAGE           COMMAND");
        assert_eq!(lines[2], "login           pulumi login");
        assert_eq!(lines[3], "generate-model  ./build-model.py");
        assert_eq!(lines[5], "working directory: /srv");
    }
}
