use std::fmt::Write;

use super::common::{self, Device, run, shell};
use paramshell::system::config::ShellConfig;
use paramshell::system::error::Error;
use paramshell::system::path::Location;
use paramshell::system::shell::{LINE_BUFFER_SIZE, MAX_ARGS, MAX_COMMANDS};

const PROMPT: &str = "root@device:/>";
const DEV_PROMPT: &str = "root@device:/dev>";
const UP: &str = "\x1B[A";
const DOWN: &str = "\x1B[B";

fn greet(out: &mut dyn Write, args: &[&str]) {
    let _ = write!(out, "hello {}\r\n", args.join(","));
}

fn count(out: &mut dyn Write, args: &[&str]) {
    let _ = write!(out, "{}\r\n", args.len());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_prints_prompt() {
        let device = Device::new();
        let params = device.params();
        let mut history = [0u8; 64];
        let config = ShellConfig::new("pump-7").unwrap();
        let mut shell = paramshell::system::shell::Shell::new(
            common::MockTransport::default(),
            paramshell::storage::MemoryStorage::<16>::new(),
            &params,
            &mut history,
            config,
        );

        assert!(shell.transport().tx.is_empty());
        shell.start();
        assert_eq!(shell.transport_mut().take_output(), "root@pump-7:/>");
    }

    #[test]
    fn test_ls_root() {
        let device = Device::new();
        let params = device.params();
        let mut history = [0u8; 64];
        let mut shell = shell(&params, &mut history, ShellConfig::default());

        assert_eq!(
            run(&mut shell, "ls\r"),
            format!("ls\r\nbin\tdev\tetc\tproc\tsbin\tvar\tlib\tsys\ttmp\tusr\t\r\n{PROMPT}")
        );
    }

    #[test]
    fn test_ls_bin_lists_commands() {
        let device = Device::new();
        let params = device.params();
        let mut history = [0u8; 64];
        let mut shell = shell(&params, &mut history, ShellConfig::default());
        shell.register_command("greet", greet).unwrap();

        let out = run(&mut shell, "ls /bin\r");
        assert_eq!(
            out,
            format!(
                "ls /bin\r\ncat\r\ncd\r\necho\r\nloadpar\r\nll\r\nls\r\nsavepar\r\nwatch\r\nwatchcsv\r\ngreet\r\n{PROMPT}"
            )
        );
    }

    #[test]
    fn test_ls_empty_and_unknown_directories() {
        let device = Device::new();
        let params = device.params();
        let mut history = [0u8; 64];
        let mut shell = shell(&params, &mut history, ShellConfig::default());

        assert_eq!(run(&mut shell, "ls tmp\r"), format!("ls tmp\r\n{PROMPT}"));
        assert_eq!(
            run(&mut shell, "ls nope\r"),
            format!("ls nope\r\nls: File or directory not found\r\n{PROMPT}")
        );
    }

    #[test]
    fn test_ll_root_and_dev() {
        let device = Device::new();
        let params = device.params();
        let mut history = [0u8; 64];
        let mut shell = shell(&params, &mut history, ShellConfig::default());

        let out = run(&mut shell, "ll\r");
        assert!(out.starts_with("ll\r\ndrwxr-xr-x\t2 root\troot\t4096 Jan  1 2025 bin\r\n"));
        assert!(out.ends_with(&format!("drwxr-xr-x\t2 root\troot\t4096 Jan  1 2025 usr\r\n\r\n{PROMPT}")));
        assert_eq!(out.matches("drwxr-xr-x").count(), 10);

        run(&mut shell, "cd /dev\r");
        assert_eq!(
            run(&mut shell, "ll\r"),
            format!(
                "ll\r\n\
                 -rwxr-xr-x\t2 root\troot\t4 Jan  1 2025 counter\r\n\
                 -r-xr-xr-x\t2 root\troot\t4 Jan  1 2025 alpha\r\n\
                 -rwxr-xr-x\t2 root\troot\t8 Jan  1 2025 alphabeta\r\n\
                 -rwxr-xr-x\t2 root\troot\t8 Jan  1 2025 label\r\n\
                 {DEV_PROMPT}"
            )
        );
    }

    #[test]
    fn test_ll_uses_configured_build_date() {
        let device = Device::new();
        let params = device.params();
        let mut history = [0u8; 64];
        let config = ShellConfig::default().with_build_date("Oct 16 2026").unwrap();
        let mut shell = shell(&params, &mut history, config);

        let out = run(&mut shell, "ll /bin\r");
        assert!(out.contains("-rwxr-xr-x\t2 root\troot\t4096 Oct 16 2026 cat\r\n"));
    }

    #[test]
    fn test_cat_unknown_parameter() {
        let device = Device::new();
        let params = device.params();
        let mut history = [0u8; 64];
        let mut shell = shell(&params, &mut history, ShellConfig::default());

        assert_eq!(
            run(&mut shell, "cat foo\r"),
            format!("cat foo\r\ncat: File or directory not found\r\n{PROMPT}")
        );
        // parameters are only visible under /dev
        assert!(run(&mut shell, "cat counter\r").contains("cat: File or directory not found"));
        assert!(run(&mut shell, "cat\r").contains("cat: File or directory not found"));
    }

    #[test]
    fn test_cd_echo_cat() {
        let device = Device::new();
        let params = device.params();
        let mut history = [0u8; 64];
        let mut shell = shell(&params, &mut history, ShellConfig::default());

        assert_eq!(run(&mut shell, "cd /dev\r"), format!("cd /dev\r\n{DEV_PROMPT}"));
        assert_eq!(shell.current_dir(), Location::Dir("dev"));

        assert_eq!(
            run(&mut shell, "echo 123 > counter\r"),
            format!("echo 123 > counter\r\n{DEV_PROMPT}")
        );
        assert_eq!(device.counter.get(), 123);
        assert_eq!(common::writes(), 1);
        assert_eq!(common::last_hook_id(), 1);

        assert_eq!(run(&mut shell, "cat counter\r"), format!("cat counter\r\n123\r\n{DEV_PROMPT}"));
    }

    #[test]
    fn test_paths_relative_and_absolute() {
        let device = Device::new();
        let params = device.params();
        let mut history = [0u8; 64];
        let mut shell = shell(&params, &mut history, ShellConfig::default());
        device.counter.set(-5);

        assert!(run(&mut shell, "cat /dev/counter\r").contains("\r\n-5\r\n"));
        assert!(run(&mut shell, "cat dev/counter\r").contains("\r\n-5\r\n"));

        run(&mut shell, "cd bin\r");
        assert_eq!(shell.current_dir(), Location::Dir("bin"));
        assert!(run(&mut shell, "cat ../dev/counter\r").contains("\r\n-5\r\n"));

        assert_eq!(run(&mut shell, "cd ..\r"), format!("cd ..\r\n{PROMPT}"));
        assert_eq!(shell.current_dir(), Location::Root);
    }

    #[test]
    fn test_cd_failures_keep_directory() {
        let device = Device::new();
        let params = device.params();
        let mut history = [0u8; 64];
        let mut shell = shell(&params, &mut history, ShellConfig::default());

        assert_eq!(
            run(&mut shell, "cd nowhere\r"),
            format!("cd nowhere\r\ncd: File or directory not found\r\n{PROMPT}")
        );
        assert!(run(&mut shell, "cd\r").contains("cd: File or directory not found\r\n"));
        assert_eq!(shell.current_dir(), Location::Root);
    }

    #[test]
    fn test_cat_runs_read_hook_and_formats_values() {
        let device = Device::new();
        let params = device.params();
        let mut history = [0u8; 64];
        let mut shell = shell(&params, &mut history, ShellConfig::default());
        run(&mut shell, "cd /dev\r");

        assert!(run(&mut shell, "cat alpha\r").contains("\r\n7\r\n"));
        assert_eq!(common::reads(), 1);
        assert_eq!(common::last_hook_id(), 2);

        run(&mut shell, "echo -2.5 > alphabeta\r");
        assert_eq!(device.alphabeta.get(), -2.5);
        assert!(run(&mut shell, "cat alphabeta\r").contains("\r\n-2.50000000\r\n"));

        run(&mut shell, "echo pump > label\r");
        assert_eq!(device.label(), "pump");
        assert!(run(&mut shell, "cat label\r").contains("\r\npump\r\n"));
    }

    #[test]
    fn test_cat_prints_text_bytes_as_stored() {
        let device = Device::new();
        let params = device.params();
        let mut history = [0u8; 64];
        let mut shell = shell(&params, &mut history, ShellConfig::default().with_local_echo(false));

        run(&mut shell, "echo h\u{e9} > /dev/label\r");
        assert_eq!(device.label[..4].iter().map(|b| b.get()).collect::<Vec<_>>(), [b'h', 0xC3, 0xA9, 0]);

        shell.input(b"cat /dev/label\r");
        assert_eq!(
            shell.transport_mut().take_bytes(),
            [b"\r\nh\xC3\xA9\r\n".as_slice(), PROMPT.as_bytes()].concat()
        );
    }

    #[test]
    fn test_echo_to_read_only_parameter() {
        let device = Device::new();
        let params = device.params();
        let mut history = [0u8; 64];
        let mut shell = shell(&params, &mut history, ShellConfig::default());

        assert_eq!(
            run(&mut shell, "echo 5 > /dev/alpha\r"),
            format!("echo 5 > /dev/alpha\r\necho: File readonly\r\n{PROMPT}")
        );
        assert_eq!(device.alpha.get(), 7);
        assert!(run(&mut shell, "echo 5 > /dev/nope\r").contains("echo: File or directory not found\r\n"));
    }

    #[test]
    fn test_echo_prints_words() {
        let device = Device::new();
        let params = device.params();
        let mut history = [0u8; 64];
        let mut shell = shell(&params, &mut history, ShellConfig::default());

        assert_eq!(
            run(&mut shell, "echo hello world\r"),
            format!("echo hello world\r\nhello world \r\n{PROMPT}")
        );
        assert_eq!(run(&mut shell, "echo\r"), format!("echo\r\n\r\n{PROMPT}"));
    }

    #[test]
    fn test_unknown_command_and_empty_line() {
        let device = Device::new();
        let params = device.params();
        let mut history = [0u8; 64];
        let mut shell = shell(&params, &mut history, ShellConfig::default());

        assert_eq!(run(&mut shell, "\r"), format!("\r\n{PROMPT}"));
        assert!(shell.history().is_empty());

        assert_eq!(
            run(&mut shell, "foo\r"),
            format!("foo\r\n/bin/sh: File or directory not found\r\n{PROMPT}")
        );
        // names match exactly
        assert!(run(&mut shell, "lsx\r").contains("/bin/sh: File or directory not found"));
        assert_eq!(shell.history().lines().collect::<Vec<_>>(), [&b"foo"[..], b"lsx"]);
    }

    #[test]
    fn test_line_feed_and_nul_are_ignored() {
        let device = Device::new();
        let params = device.params();
        let mut history = [0u8; 64];
        let mut shell = shell(&params, &mut history, ShellConfig::default());

        assert_eq!(run(&mut shell, "echo a\r\n"), format!("echo a\r\na \r\n{PROMPT}"));
        assert_eq!(run(&mut shell, "echo b\r\0"), format!("echo b\r\nb \r\n{PROMPT}"));
        assert!(shell.line().is_empty());
    }

    #[test]
    fn test_backspace() {
        let device = Device::new();
        let params = device.params();
        let mut history = [0u8; 64];
        let mut shell = shell(&params, &mut history, ShellConfig::default());

        assert_eq!(run(&mut shell, "ab\x7f"), "ab\x7f \x1B[1D");
        assert_eq!(shell.line(), b"a");
        assert_eq!(run(&mut shell, "\x08"), "\x08 \x1B[1D");
        assert!(shell.line().is_empty());
        assert_eq!(run(&mut shell, "\x7f"), "\x07");
    }

    #[test]
    fn test_local_echo_off() {
        let device = Device::new();
        let params = device.params();
        let mut history = [0u8; 64];
        let mut shell = shell(&params, &mut history, ShellConfig::default().with_local_echo(false));

        assert_eq!(run(&mut shell, "echo hi"), "");
        assert_eq!(shell.line(), b"echo hi");
        assert_eq!(run(&mut shell, "\r"), format!("\r\nhi \r\n{PROMPT}"));
    }

    #[test]
    fn test_full_line_dispatches_and_drops_byte() {
        let device = Device::new();
        let params = device.params();
        let mut history = [0u8; 128];
        let mut shell = shell(&params, &mut history, ShellConfig::default());

        let typed = "x".repeat(LINE_BUFFER_SIZE - 1);
        assert_eq!(run(&mut shell, &typed), typed);
        assert_eq!(shell.line().len(), LINE_BUFFER_SIZE - 1);

        assert_eq!(
            run(&mut shell, "y"),
            format!("\r\n/bin/sh: File or directory not found\r\n{PROMPT}")
        );
        assert!(shell.line().is_empty());
        assert_eq!(shell.history().lines().last(), Some(typed.as_bytes()));
    }

    #[test]
    fn test_tab_completes_parameter() {
        let device = Device::new();
        let params = device.params();
        let mut history = [0u8; 64];
        let mut shell = shell(&params, &mut history, ShellConfig::default());
        run(&mut shell, "cd /dev\r");

        assert_eq!(run(&mut shell, "cat al\t"), "cat alpha");
        assert_eq!(shell.line(), b"cat alpha");

        // "alpha" and "alphabeta" agree on nothing more
        assert_eq!(run(&mut shell, "\t"), "");
        assert_eq!(run(&mut shell, "\r"), format!("\r\n7\r\n{DEV_PROMPT}"));
    }

    #[test]
    fn test_tab_echoes_completion_without_local_echo() {
        let device = Device::new();
        let params = device.params();
        let mut history = [0u8; 64];
        let mut shell = shell(&params, &mut history, ShellConfig::default().with_local_echo(false));

        assert_eq!(run(&mut shell, "cat /dev/cou\t"), "nter");
        assert_eq!(shell.line(), b"cat /dev/counter");
        // outside /dev nothing completes
        assert_eq!(run(&mut shell, "\r"), format!("\r\n0\r\n{PROMPT}"));
        assert_eq!(run(&mut shell, "cat cou\t"), "");
    }

    #[test]
    fn test_tab_completes_command() {
        let device = Device::new();
        let params = device.params();
        let mut history = [0u8; 64];
        let mut shell = shell(&params, &mut history, ShellConfig::default());

        assert_eq!(run(&mut shell, "\t"), "");
        assert_eq!(run(&mut shell, "wa\t"), "watch");
        assert_eq!(shell.line(), b"watch");
        assert!(run(&mut shell, "\x7f\x7f\x7f\x7f\x7fe\t").ends_with("echo"));
        assert_eq!(shell.line(), b"echo");
        // trailing space: nothing to complete
        assert_eq!(run(&mut shell, " \t"), " ");
    }

    #[test]
    fn test_tab_does_not_overflow_line() {
        let device = Device::new();
        let params = device.params();
        let mut history = [0u8; 64];
        let mut shell = shell(&params, &mut history, ShellConfig::default());

        let typed = "echo 12345678901234567890 > /dev/cou";
        assert_eq!(typed.len(), 36);
        assert_eq!(run(&mut shell, &format!("{typed}\t")), typed);
        assert_eq!(shell.line(), typed.as_bytes());
    }

    #[test]
    fn test_history_recall_redraws_line() {
        let device = Device::new();
        let params = device.params();
        let mut history = [0u8; 64];
        let mut shell = shell(&params, &mut history, ShellConfig::default());

        run(&mut shell, "ls\r");
        run(&mut shell, "cd /dev\r");

        assert_eq!(run(&mut shell, UP), "cd /dev");
        assert_eq!(shell.line(), b"cd /dev");
        assert_eq!(run(&mut shell, UP), "\x08\x08\x08\x08\x08\x08\x08ls\x1B[K");
        assert_eq!(shell.line(), b"ls");
        assert_eq!(run(&mut shell, UP), "");

        assert_eq!(run(&mut shell, DOWN), "\x08\x08cd /dev");
        assert_eq!(run(&mut shell, DOWN), "");
        assert_eq!(shell.line(), b"cd /dev");

        assert_eq!(run(&mut shell, "\r"), format!("\r\n{DEV_PROMPT}"));
        // a dispatched line restarts recall from the newest entry
        assert_eq!(run(&mut shell, UP), "cd /dev");
    }

    #[test]
    fn test_left_right_arrows_are_swallowed() {
        let device = Device::new();
        let params = device.params();
        let mut history = [0u8; 64];
        let mut shell = shell(&params, &mut history, ShellConfig::default());

        assert_eq!(run(&mut shell, "l\x1B[D\x1B[Cs"), "ls");
        assert_eq!(shell.line(), b"ls");
    }

    #[test]
    fn test_history_disabled() {
        let device = Device::new();
        let params = device.params();
        let mut history = [0u8; 0];
        let mut shell = shell(&params, &mut history, ShellConfig::default());

        run(&mut shell, "ls\r");
        assert_eq!(run(&mut shell, UP), "");
        assert!(shell.line().is_empty());
    }

    #[test]
    fn test_register_command() {
        let device = Device::new();
        let params = device.params();
        let mut history = [0u8; 64];
        let mut shell = shell(&params, &mut history, ShellConfig::default());

        shell.register_command("greet", greet).unwrap();
        assert_eq!(run(&mut shell, "greet a b\r"), format!("greet a b\r\nhello a,b\r\n{PROMPT}"));
        assert_eq!(shell.register_command("", greet), Err(Error::InvalidName));
        assert_eq!(shell.register_command("two words", greet), Err(Error::InvalidName));
    }

    #[test]
    fn test_argument_splitting() {
        let device = Device::new();
        let params = device.params();
        let mut history = [0u8; 64];
        let mut shell = shell(&params, &mut history, ShellConfig::default().with_local_echo(false));
        shell.register_command("count", count).unwrap();

        assert_eq!(run(&mut shell, "count\r"), format!("\r\n0\r\n{PROMPT}"));
        assert_eq!(run(&mut shell, "count \r"), format!("\r\n0\r\n{PROMPT}"));
        assert_eq!(run(&mut shell, "count  x\r"), format!("\r\n2\r\n{PROMPT}"));
        assert_eq!(
            run(&mut shell, "count 1 2 3 4 5 6 7 8 9 a b c\r"),
            format!("\r\n{MAX_ARGS}\r\n{PROMPT}")
        );
    }

    #[test]
    fn test_command_table_capacity() {
        const NAMES: [&str; 12] = ["c0", "c1", "c2", "c3", "c4", "c5", "c6", "c7", "c8", "c9", "c10", "c11"];

        let device = Device::new();
        let params = device.params();
        let mut history = [0u8; 64];
        let mut shell = shell(&params, &mut history, ShellConfig::default());

        let free = MAX_COMMANDS - shell.commands().count();
        for &name in &NAMES[..free] {
            shell.register_command(name, count).unwrap();
        }
        assert_eq!(shell.register_command(NAMES[free], count), Err(Error::CapacityExceeded));
        assert_eq!(shell.commands().count(), MAX_COMMANDS);
        assert!(run(&mut shell, "c10\r").contains("\r\n0\r\n"));
    }

    #[test]
    fn test_commands_are_read_from_transport_on_poll() {
        let device = Device::new();
        let params = device.params();
        let mut history = [0u8; 64];
        let mut shell = shell(&params, &mut history, ShellConfig::default());

        shell.transport_mut().push(b"cd /dev\r");
        shell.poll(0);
        assert!(shell.transport().rx.is_empty());
        assert_eq!(shell.transport_mut().take_output(), format!("cd /dev\r\n{DEV_PROMPT}"));
    }

    #[test]
    fn test_write_failure_does_not_stop_shell() {
        let device = Device::new();
        let params = device.params();
        let mut history = [0u8; 64];
        let mut shell = shell(&params, &mut history, ShellConfig::default());

        shell.transport_mut().fail_writes = true;
        shell.input(b"echo 9 > /dev/counter\r");
        assert_eq!(device.counter.get(), 9);
        assert!(shell.line().is_empty());

        shell.transport_mut().fail_writes = false;
        assert!(run(&mut shell, "cat /dev/counter\r").contains("\r\n9\r\n"));
    }

    #[test]
    fn test_invalid_utf8_line() {
        let device = Device::new();
        let params = device.params();
        let mut history = [0u8; 64];
        let mut shell = shell(&params, &mut history, ShellConfig::default().with_local_echo(false));

        shell.input(&[0xC3, b'\r']);
        assert_eq!(
            shell.transport_mut().take_output(),
            format!("\r\n/bin/sh: File or directory not found\r\n{PROMPT}")
        );
    }
}
