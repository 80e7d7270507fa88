pub fn render_schema() -> String {
	expand_includes(include_str!("../../../sql/init.sql"))
}

fn expand_includes(sql: &str) -> String {
	let mut out = String::new();

	for line in sql.lines() {
		let trimmed = line.trim();

		if let Some(path) = trimmed.strip_prefix("\\ir ") {
			match path.trim() {
				"tables/001_teams.sql" => out.push_str(include_str!("../../../sql/tables/001_teams.sql")),
				"tables/002_users.sql" => out.push_str(include_str!("../../../sql/tables/002_users.sql")),
				"tables/003_team_members.sql" =>
					out.push_str(include_str!("../../../sql/tables/003_team_members.sql")),
				"tables/004_channels.sql" =>
					out.push_str(include_str!("../../../sql/tables/004_channels.sql")),
				"tables/005_channel_members.sql" =>
					out.push_str(include_str!("../../../sql/tables/005_channel_members.sql")),
				"tables/006_posts.sql" => out.push_str(include_str!("../../../sql/tables/006_posts.sql")),
				_ => out.push_str(line),
			}
		} else {
			out.push_str(line);
		}

		out.push('\n');
	}

	out
}
