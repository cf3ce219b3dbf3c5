pub fn render_schema() -> String {
	expand_includes(include_str!("../../../sql/init.sql"))
}

fn expand_includes(sql: &str) -> String {
	let mut out = String::new();

	for line in sql.lines() {
		let trimmed = line.trim();

		if let Some(path) = trimmed.strip_prefix("\\ir ") {
			match path.trim() {
				"tables/001_annotations.sql" =>
					out.push_str(include_str!("../../../sql/tables/001_annotations.sql")),
				"tables/002_annotation_bookmarks.sql" =>
					out.push_str(include_str!("../../../sql/tables/002_annotation_bookmarks.sql")),
				"tables/003_annotation_tags.sql" =>
					out.push_str(include_str!("../../../sql/tables/003_annotation_tags.sql")),
				"tables/004_custom_lists.sql" =>
					out.push_str(include_str!("../../../sql/tables/004_custom_lists.sql")),
				"tables/005_annotation_list_entries.sql" => out
					.push_str(include_str!("../../../sql/tables/005_annotation_list_entries.sql")),
				"tables/006_pages.sql" =>
					out.push_str(include_str!("../../../sql/tables/006_pages.sql")),
				"tables/007_fav_icons.sql" =>
					out.push_str(include_str!("../../../sql/tables/007_fav_icons.sql")),
				"tables/008_page_fetch_backlog.sql" =>
					out.push_str(include_str!("../../../sql/tables/008_page_fetch_backlog.sql")),
				_ => out.push_str(line),
			}
		} else {
			out.push_str(line);
		}

		out.push('\n');
	}

	out
}
