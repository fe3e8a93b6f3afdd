pub fn render_schema() -> String {
	let init = include_str!("../../../sql/init.sql");

	expand_includes(init)
}

fn expand_includes(sql: &str) -> String {
	let mut out = String::new();

	for line in sql.lines() {
		let trimmed = line.trim();

		if let Some(path) = trimmed.strip_prefix("\\ir ") {
			match path.trim() {
				"tables/001_gtin_matrix.sql" =>
					out.push_str(include_str!("../../../sql/tables/001_gtin_matrix.sql")),
				"tables/002_matrix_locations.sql" =>
					out.push_str(include_str!("../../../sql/tables/002_matrix_locations.sql")),
				_ => out.push_str(line),
			}
		} else {
			out.push_str(line);
		}

		out.push('\n');
	}

	out
}

#[cfg(test)]
mod tests {
	#[test]
	fn includes_are_expanded() {
		let sql = super::render_schema();

		assert!(!sql.contains("\\ir "));
		assert!(sql.contains("CREATE TABLE IF NOT EXISTS gtin_matrix"));
		assert!(sql.contains("CREATE TABLE IF NOT EXISTS matrix_locations"));
	}
}
