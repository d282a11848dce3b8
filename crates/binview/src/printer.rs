// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Indented text dump of an instance tree, for diagnostics.

use crate::config::PrintConfig;
use crate::error::Result;
use crate::instance::{Field, Instance};
use std::fmt::Write;

/// Render `instance` and everything below it.
///
/// Collections print at most `config.max_elements` elements followed by a
/// summary line. Navigation errors (truncated data, for example) abort the
/// dump and are returned.
pub fn print_instance(instance: &Instance, config: &PrintConfig) -> Result<String> {
    let mut printer = Printer {
        out: String::new(),
        config,
    };
    printer.instance(None, instance, 0)?;
    Ok(printer.out)
}

struct Printer<'a> {
    out: String,
    config: &'a PrintConfig,
}

impl Printer<'_> {
    fn line(&mut self, depth: usize, offset: u64, text: &str) {
        if self.config.show_offsets {
            let _ = write!(self.out, "{:>10}  ", format!("@{}", offset));
        }
        let _ = writeln!(self.out, "{:width$}{}", "", text, width = depth * self.config.indent);
    }

    fn field(&mut self, label: &str, field: Field, offset: u64, depth: usize) -> Result<()> {
        match field {
            Field::Scalar(value) => {
                self.line(depth, offset, &format!("{} = {}", label, value));
                Ok(())
            }
            Field::Instance(child) => self.instance(Some(label), &child, depth),
        }
    }

    fn instance(&mut self, label: Option<&str>, instance: &Instance, depth: usize) -> Result<()> {
        let prefix = label.map(|l| format!("{}: ", l)).unwrap_or_default();
        let position = instance.position();

        if instance.is_composite() {
            self.line(depth, position, &format!("{}{} {{", prefix, instance.type_name()));
            let desc = instance.type_desc().clone();
            if let Some(composite) = desc.as_composite() {
                for (index, member) in composite.members().iter().enumerate() {
                    let offset = instance.member_offset(member.name())?;
                    let field = instance.get_member_at(index)?;
                    self.field(member.name(), field, offset, depth + 1)?;
                }
            }
            self.line(depth, position, "}");
            return Ok(());
        }

        let count = instance.element_count()?;
        self.line(
            depth,
            position,
            &format!("{}{} ({} elements) [", prefix, instance.type_name(), count),
        );
        let shown = count.min(self.config.max_elements);
        for index in 0..shown {
            let index = index as i64;
            let offset = instance.element_offset(index)?;
            let field = instance.get_element(index)?;
            self.field(&format!("[{}]", index), field, offset, depth + 1)?;
        }
        if count > shown {
            self.line(depth + 1, position, &format!("... {} more", count - shown));
        }
        self.line(depth, position, "]");
        Ok(())
    }
}
