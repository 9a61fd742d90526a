//! Windows spooler backend
//!
//! Uses the Win32 print spooler API to submit RAW documents to installed
//! printer queues.

use super::Spooler;
use crate::error::{PrintError, PrintResult};
use tracing::{instrument, warn};
use windows::Win32::Graphics::Printing::{
    AbortPrinter, ClosePrinter, DOC_INFO_1W, EndDocPrinter, EndPagePrinter, EnumPrintersW,
    GetDefaultPrinterW, OpenPrinterW, PRINTER_ENUM_CONNECTIONS, PRINTER_ENUM_LOCAL,
    PRINTER_HANDLE, PRINTER_INFO_5W, StartDocPrinterW, StartPagePrinter, WritePrinter,
};
use windows::core::{PCWSTR, PWSTR};

fn to_wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}

fn spool_err(step: &str) -> PrintError {
    PrintError::Spooler(format!("{} failed", step))
}

/// Submits raw jobs through the Win32 spooler
#[derive(Debug, Default)]
pub struct WindowsSpooler;

/// Open printer handle, closed on drop
struct PrinterHandle(PRINTER_HANDLE);

impl PrinterHandle {
    fn open(name: &str) -> PrintResult<Self> {
        let name_w = to_wide(name);
        let mut handle = PRINTER_HANDLE::default();
        unsafe {
            OpenPrinterW(PCWSTR::from_raw(name_w.as_ptr()), &mut handle, None)
                .map_err(|_| PrintError::PrinterNotFound(name.to_string()))?;
        }
        Ok(Self(handle))
    }
}

impl Drop for PrinterHandle {
    fn drop(&mut self) {
        unsafe {
            let _ = ClosePrinter(self.0);
        }
    }
}

impl Spooler for WindowsSpooler {
    fn default_printer(&self) -> PrintResult<Option<String>> {
        unsafe {
            let mut needed: u32 = 0;
            let _ = GetDefaultPrinterW(None, &mut needed);

            if needed == 0 {
                return Ok(None);
            }

            let mut buf: Vec<u16> = vec![0; needed as usize];
            let ok = GetDefaultPrinterW(Some(PWSTR(buf.as_mut_ptr())), &mut needed);

            if !ok.as_bool() {
                return Ok(None);
            }

            let name = PWSTR(buf.as_mut_ptr())
                .to_string()
                .map_err(|e| PrintError::Spooler(format!("UTF-16 decode failed: {}", e)))?;

            Ok(Some(name).filter(|n| !n.is_empty()))
        }
    }

    fn list_printers(&self) -> PrintResult<Vec<String>> {
        unsafe {
            let flags = PRINTER_ENUM_LOCAL | PRINTER_ENUM_CONNECTIONS;
            let mut needed: u32 = 0;
            let mut returned: u32 = 0;

            let _ = EnumPrintersW(flags, None, 5, None, &mut needed, &mut returned);

            if needed == 0 {
                return Ok(Vec::new());
            }

            let mut buf: Vec<u8> = vec![0; needed as usize];
            EnumPrintersW(
                flags,
                None,
                5,
                Some(buf.as_mut_slice()),
                &mut needed,
                &mut returned,
            )
            .map_err(|_| spool_err("EnumPrintersW"))?;

            let ptr = buf.as_ptr() as *const PRINTER_INFO_5W;
            let slice = std::slice::from_raw_parts(ptr, returned as usize);

            Ok(slice
                .iter()
                .filter(|info| !info.pPrinterName.is_null())
                .filter_map(|info| PWSTR(info.pPrinterName.0).to_string().ok())
                .collect())
        }
    }

    #[instrument(skip(self, data), fields(data_len = data.len()))]
    fn submit_raw(&self, printer: &str, document: &str, data: &[u8]) -> PrintResult<()> {
        use core::ffi::c_void;

        let handle = PrinterHandle::open(printer)?;

        let doc_name_w = to_wide(document);
        let datatype_w = to_wide("RAW");
        let doc_info = DOC_INFO_1W {
            pDocName: PWSTR(doc_name_w.as_ptr() as *mut _),
            pOutputFile: PWSTR::null(),
            pDatatype: PWSTR(datatype_w.as_ptr() as *mut _),
        };

        unsafe {
            if StartDocPrinterW(handle.0, 1, &doc_info as *const DOC_INFO_1W) == 0 {
                return Err(spool_err("StartDocPrinter"));
            }

            // From here on a failure must remove the half-built job
            let abort = |step: &str| {
                warn!(printer, step, "Aborting spool job");
                let _ = AbortPrinter(handle.0);
                spool_err(step)
            };

            if !StartPagePrinter(handle.0).as_bool() {
                return Err(abort("StartPagePrinter"));
            }

            let mut written: u32 = 0;
            let ok = WritePrinter(
                handle.0,
                data.as_ptr() as *const c_void,
                data.len() as u32,
                &mut written,
            );

            if !ok.as_bool() {
                return Err(abort("WritePrinter"));
            }

            if written != data.len() as u32 {
                return Err(abort("Incomplete write"));
            }

            if !EndPagePrinter(handle.0).as_bool() {
                return Err(abort("EndPagePrinter"));
            }

            if !EndDocPrinter(handle.0).as_bool() {
                return Err(abort("EndDocPrinter"));
            }
        }

        Ok(())
    }
}
