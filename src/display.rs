use std::io::{self, Write};

use crate::types::{ChangedFile, Comment, PullRequestReport};

struct ReportFormatter<'a> {
    report: &'a PullRequestReport,
}

impl<'a> ReportFormatter<'a> {
    fn new(report: &'a PullRequestReport) -> Self {
        Self { report }
    }

    fn format<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        self.write_header(writer)?;
        self.write_comments_section(writer)?;
        self.write_files_section(writer)?;
        Ok(())
    }

    fn write_header<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        let pr = self.report;
        writeln!(writer, "Pull Request Number: {}", pr.number)?;
        writeln!(writer, "Title: {}", pr.title)?;
        writeln!(writer, "State: {}", pr.state)?;
        writeln!(writer, "Created At: {}", pr.created_at)?;
        writeln!(writer, "Author: {}", pr.author)?;
        Ok(())
    }

    fn write_comments_section<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writeln!(writer, "Comments:")?;
        for comment in &self.report.comments {
            write_comment(comment, writer)?;
        }
        Ok(())
    }

    fn write_files_section<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writeln!(writer, "Files:")?;
        for file in &self.report.files {
            write_file(file, writer)?;
        }
        Ok(())
    }
}

fn write_comment<W: Write>(comment: &Comment, writer: &mut W) -> io::Result<()> {
    writeln!(writer, "  Author: {}", comment.author)?;
    writeln!(writer, "  Body: {}", comment.body)?;
    writeln!(writer, "  Created At: {}", comment.created_at)?;
    writeln!(writer)
}

fn write_file<W: Write>(file: &ChangedFile, writer: &mut W) -> io::Result<()> {
    writeln!(writer, "  Path: {}", file.path)?;
    writeln!(writer, "  Additions: {}", file.additions)?;
    writeln!(writer, "  Deletions: {}", file.deletions)?;
    writeln!(writer)
}

/// Writes the human-readable report for `report`.
pub fn write_report<W: Write>(report: &PullRequestReport, writer: &mut W) -> io::Result<()> {
    ReportFormatter::new(report).format(writer)
}
