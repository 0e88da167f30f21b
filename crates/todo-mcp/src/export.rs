//! HTML rendering of the task table.

use std::fmt::Write;
use todo_core::Task;

const STYLE: &str = "body{font-family:sans-serif;margin:2em}\
table{border-collapse:collapse}\
th,td{border:1px solid #ccc;padding:4px 8px;text-align:left}\
tr[data-status=COMPLETED] td{color:#888}\
tr[data-status=BLOCKED] td{background:#fdecea}\
tr[data-status=READY] td{background:#eafaf1}";

const SCRIPT: &str = r#"document.getElementById('status-filter').addEventListener('change', function (event) {
  var wanted = event.target.value;
  document.querySelectorAll('#tasks tbody tr').forEach(function (row) {
    row.style.display = (wanted === '' || row.dataset.status === wanted) ? '' : 'none';
  });
});"#;

const STATUSES: [&str; 5] = ["PENDING", "READY", "BLOCKED", "IN_PROGRESS", "COMPLETED"];

/// Render `tasks` as a standalone HTML page, one row per task in the given
/// order, with a status filter.
pub fn render_html(tasks: &[&Task]) -> String {
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>Tasks</title>\n");
    let _ = writeln!(html, "<style>{}</style>", STYLE);
    html.push_str("</head>\n<body>\n<h1>Tasks</h1>\n");

    html.push_str("<label for=\"status-filter\">Status</label>\n<select id=\"status-filter\">\n<option value=\"\">All</option>\n");
    for status in STATUSES {
        let _ = writeln!(html, "<option value=\"{0}\">{0}</option>", status);
    }
    html.push_str("</select>\n");

    html.push_str("<table id=\"tasks\">\n<thead><tr><th>ID</th><th>Title</th><th>Status</th><th>Depends on</th></tr></thead>\n<tbody>\n");
    for task in tasks {
        let depends_on = task
            .dependencies()
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ");

        let _ = writeln!(
            html,
            "<tr data-status=\"{status}\"><td>{id}</td><td>{title}</td><td>{status}</td><td>{deps}</td></tr>",
            status = task.status(),
            id = escape(&task.id),
            title = escape(&task.title),
            deps = escape(&depends_on),
        );
    }
    html.push_str("</tbody>\n</table>\n");

    let _ = writeln!(html, "<script>\n{}\n</script>", SCRIPT);
    html.push_str("</body>\n</html>\n");

    html
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use todo_core::TaskManager;

    #[test]
    fn test_escape() {
        assert_eq!(escape("<b>\"R&D\"</b> it's"), "&lt;b&gt;&quot;R&amp;D&quot;&lt;/b&gt; it&#39;s");
    }

    #[test]
    fn test_render_rows_in_order() {
        let mut manager = TaskManager::new();
        manager.add_task(Task::new("build", "Build <release>")).unwrap();
        manager.add_task(Task::new("ship", "Ship it")).unwrap();
        manager.add_dependency("ship", "build").unwrap();

        let html = render_html(&manager.topological_order());

        assert!(html.contains("<script"));
        assert!(html.contains("Build &lt;release&gt;"));
        assert!(!html.contains("<release>"));
        assert!(html.contains("<tr data-status=\"BLOCKED\"><td>ship</td>"));

        let build = html.find("<td>build</td>").unwrap();
        let ship = html.find("<td>ship</td>").unwrap();
        assert!(build < ship);
    }

    #[test]
    fn test_render_empty() {
        let html = render_html(&[]);
        assert!(html.contains("<tbody>\n</tbody>"));
    }
}
