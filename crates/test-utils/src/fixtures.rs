// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Test fixtures and sample resource files

use std::io::Write;

use tempfile::NamedTempFile;

/// Sample resource file contents for testing
pub struct ResourceFixtures;

impl ResourceFixtures {
    // ===== Single entries =====

    /// One named multi-line query
    pub const fn single_query() -> &'static str {
        "-- name: top_customers\n\
         SELECT name, total\n\
         FROM customers\n\
         ORDER BY total DESC;\n"
    }

    /// A name label followed by a query on one line
    pub const fn one_line_query() -> &'static str {
        "-- name: all_iris\n\
         SELECT * FROM iris;\n"
    }

    // ===== Mixed files =====

    /// Two queries with comments and blank lines around them
    pub const fn two_queries() -> &'static str {
        "-- analytics queries\n\
         \n\
         -- name: daily_totals\n\
         SELECT day,\n\
         \x20      sum(amount) -- gross\n\
         FROM sales\n\
         GROUP BY day;\n\
         \n\
         -- name: Recent_Events\n\
         SELECT * FROM events WHERE ts > now() - interval '1 day';\n"
    }

    /// The same name twice; the later query wins
    pub const fn duplicate_names() -> &'static str {
        "-- name: q\n\
         SELECT 1;\n\
         -- name: Q\n\
         SELECT 2;\n"
    }

    /// The last query never reaches its terminator
    pub const fn unterminated() -> &'static str {
        "-- name: done\n\
         SELECT 1;\n\
         -- name: pending\n\
         SELECT *\n\
         FROM t\n"
    }

    /// Nothing but comments
    pub const fn comments_only() -> &'static str {
        "-- nothing to see\n-- here either\n"
    }
}

/// Write `content` into a fresh temporary `.sql` file
///
/// The file lives as long as the returned handle.
pub fn write_resource_file(content: &str) -> std::io::Result<NamedTempFile> {
    let mut file = tempfile::Builder::new().suffix(".sql").tempfile()?;
    file.write_all(content.as_bytes())?;
    file.flush()?;
    Ok(file)
}
